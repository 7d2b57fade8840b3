//! Helpers for tests that need a real device. They return `None` on
//! machines without a usable adapter so those tests skip instead of failing,
//! and say so at `warn` level.

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub fn skip_notice(test: &str, reason: &str) -> String {
    format!("SKIPPED {}: {} (GPU coverage not exercised)", test, reason)
}

pub fn headless_device(test: &str) -> Option<(wgpu::Device, wgpu::Queue)> {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }));

    let Some(adapter) = adapter else {
        log::warn!("{}", skip_notice(test, "no adapter available"));
        return None;
    };

    match pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None)) {
        Ok(pair) => Some(pair),
        Err(e) => {
            log::warn!("{}", skip_notice(test, &format!("device request failed: {}", e)));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_notice_names_the_test() {
        let notice = skip_notice("hexagon_program_links", "no adapter available");
        assert!(notice.starts_with("SKIPPED hexagon_program_links"));
        assert!(notice.contains("no adapter available"));
    }

    #[test]
    fn test_format_is_not_srgb() {
        assert!(!COLOR_FORMAT.is_srgb());
    }
}
