mod app;
mod error;
mod frame;
mod mesh;
mod settings;
mod shader;

#[cfg(test)]
mod testing;

use anyhow::anyhow;
use winit::event_loop::EventLoop;

use app::Application;
use error::BootstrapError;
use settings::Settings;

fn main() {
    let settings = Settings::default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log_filter))
        .target(env_logger::Target::Stdout)
        .init();

    if let Err(err) = run(&settings) {
        if !already_logged(&err) {
            log::error!("{:#}", err);
        }
        std::process::exit(-1);
    }
}

/// Shader failures are logged per stage where they happen.
fn already_logged(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<BootstrapError>(),
        Some(BootstrapError::Shader(_))
    )
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(|e| BootstrapError::Window(e.to_string()))?;
    let application = pollster::block_on(Application::new(&event_loop, settings))?;

    application
        .run(event_loop)
        .map_err(|e| anyhow!("event loop stopped: {}", e))?;

    log::info!("Shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShaderError;
    use crate::shader::ShaderStage;

    #[test]
    fn shader_failures_are_not_logged_twice() {
        let compile: anyhow::Error = BootstrapError::from(ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: "expected ')'".to_string(),
        })
        .into();
        assert!(already_logged(&compile));

        let link: anyhow::Error = BootstrapError::from(ShaderError::Link {
            log: "location mismatch".to_string(),
        })
        .into();
        assert!(already_logged(&link));
    }

    #[test]
    fn setup_failures_are_logged_at_exit() {
        let window: anyhow::Error = BootstrapError::Window("no display".to_string()).into();
        assert!(!already_logged(&window));

        let other = anyhow!("event loop stopped: boom");
        assert!(!already_logged(&other));
    }
}
