use winit::{
    error::EventLoopError,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::error::BootstrapError;
use crate::frame::FrameControl;
use crate::mesh::Mesh;
use crate::settings::Settings;
use crate::shader::Program;

// Fields drop top to bottom: program, buffers, then the context, then the
// window the surface was created from.
pub struct Application {
    program: Program,
    mesh: Mesh,
    window_surface: wgpu::Surface,
    device: wgpu::Device,
    command_queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    frame: FrameControl,
    clear_color: wgpu::Color,
    window: Window,
}

impl Application {
    pub async fn new(
        event_loop: &EventLoop<()>,
        settings: &Settings,
    ) -> Result<Application, BootstrapError> {
        let window = WindowBuilder::new()
            .with_title(settings.title)
            .with_resizable(true)
            .with_inner_size(settings.window_size())
            .build(event_loop)
            .map_err(|e| BootstrapError::Window(e.to_string()))?;
        log::info!("Created {}x{} window", settings.width, settings.height);

        let mut size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            size = settings.window_size();
        }

        // Instance - Handle to the GPU. Use this to get adapter and surface
        let wgpu_instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // --SAFETY--
        // The surface needs to live as long as the window that created it.
        // Application owns both and drops the surface first.
        let window_surface = unsafe { wgpu_instance.create_surface(&window) }
            .map_err(|e| BootstrapError::Context(e.to_string()))?;

        let adapter = wgpu_instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&window_surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BootstrapError::Context("no compatible adapter".to_string()))?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, command_queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("main device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| BootstrapError::Context(e.to_string()))?;

        let surface_caps = window_surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats).ok_or_else(|| {
            BootstrapError::Context("surface is incompatible with the adapter".to_string())
        })?;
        log::info!("Surface format {:?}", surface_format);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        window_surface.configure(&device, &config);

        let program = Program::hexagon(&device, config.format)?;
        let mesh = Mesh::hexagon(&device)?;

        Ok(Application {
            program,
            mesh,
            window_surface,
            device,
            command_queue,
            config,
            frame: FrameControl::new(size),
            clear_color: settings.clear_color,
            window,
        })
    }

    /// Runs the frame loop until Escape or a close request, then tears down.
    pub fn run(self, event_loop: EventLoop<()>) -> Result<(), EventLoopError> {
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = Some(self);
        event_loop.run(move |event, elwt| {
            match event {
                Event::WindowEvent { window_id, event } => {
                    if let Some(state) = app.as_mut() {
                        if window_id == state.window.id() {
                            state.window_event(event);
                        }
                    }
                }
                Event::LoopExiting => {
                    if let Some(state) = app.take() {
                        log::debug!("Leaving frame loop in state {:?}", state.frame.state());
                        state.teardown();
                    }
                }
                _ => (),
            }

            if app.as_ref().map_or(false, |state| state.frame.should_close()) {
                elwt.exit();
            }
        })
    }

    fn window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.frame.on_close_requested(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key, state, ..
                    },
                ..
            } => self.frame.on_key(&logical_key, state),

            WindowEvent::Resized(physical_size) => self.resize(physical_size),

            WindowEvent::RedrawRequested => {
                if self.frame.should_close() {
                    return;
                }

                let now = instant::Instant::now();
                match self.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if lost
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        self.window_surface.configure(&self.device, &self.config)
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory, closing");
                        self.frame.close();
                    }
                    // Timeout should be resolved by the next frame
                    Err(e) => log::warn!("Dropped frame: {:?}", e),
                }
                log::trace!("Frame took {}us", now.elapsed().as_micros());

                self.window.request_redraw();
            }

            _ => (),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.frame.on_resize(new_size).is_some() {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.window_surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.window_surface.get_current_texture()?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // begin_render_pass borrows the encoder mutably until the pass is dropped
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.frame.viewport().apply(&mut render_pass);
            self.program.bind(&mut render_pass);
            self.mesh.draw(&mut render_pass);
        }

        self.command_queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn teardown(mut self) {
        self.frame.finish();

        let Application {
            program,
            mesh,
            window_surface,
            device,
            command_queue,
            window,
            ..
        } = self;

        drop(program);
        mesh.destroy();
        drop(window_surface);
        drop(command_queue);
        drop(device);
        drop(window);
        log::info!("Released GPU resources");
    }
}

/// Prefers a non-sRGB surface so colours are written as given, without the
/// sRGB encode on store. Falls back to the first supported format.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}
