/// Fixed startup settings for the window and graphics context.
///
/// There is no runtime configuration: every value here is baked in at
/// compile time and the process takes no arguments.
#[derive(Clone, Debug)]
pub struct Settings {
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    pub power_preference: wgpu::PowerPreference,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_filter: &'static str,
}

impl Settings {
    pub fn window_size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.width, self.height)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "MyProject",
            width: 800,
            height: 480,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.11,
                a: 1.0,
            },
            power_preference: wgpu::PowerPreference::HighPerformance,
            log_filter: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn",
        }
    }
}
