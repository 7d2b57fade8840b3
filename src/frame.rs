use winit::{
    dpi::PhysicalSize,
    event::ElementState,
    keyboard::{Key, NamedKey},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Close flag set; the loop exits before the next frame.
    Closing,
    Closed,
}

/// Region of the surface the draw call rasterizes into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn from_size(size: PhysicalSize<u32>) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn apply(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_viewport(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        );
    }
}

/// Frame loop bookkeeping: the `Running -> Closing -> Closed` state and the
/// viewport that follows window resizes.
#[derive(Debug)]
pub struct FrameControl {
    state: LoopState,
    viewport: Viewport,
}

impl FrameControl {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            state: LoopState::Running,
            viewport: Viewport::from_size(size),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn should_close(&self) -> bool {
        self.state != LoopState::Running
    }

    /// Escape is the only key the loop reacts to.
    pub fn on_key(&mut self, key: &Key, state: ElementState) {
        if state == ElementState::Pressed && *key == Key::Named(NamedKey::Escape) {
            log::info!("Escape pressed, closing");
            self.close();
        }
    }

    pub fn on_close_requested(&mut self) {
        log::info!("Window close requested");
        self.close();
    }

    /// Returns the new viewport, or `None` for a zero-sized (minimised)
    /// window, in which case the old viewport is kept.
    pub fn on_resize(&mut self, size: PhysicalSize<u32>) -> Option<Viewport> {
        if size.width == 0 || size.height == 0 {
            return None;
        }
        self.viewport = Viewport::from_size(size);
        log::debug!("Viewport is now {}x{}", size.width, size.height);
        Some(self.viewport)
    }

    /// Moves to the terminal `Closed` state once the loop has exited.
    pub fn finish(&mut self) {
        self.state = LoopState::Closed;
    }

    /// Sets the close flag. Has no effect once the loop is closing.
    pub fn close(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Closing;
        }
    }
}
