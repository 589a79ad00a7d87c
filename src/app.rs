use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::error::{EventLoopError, OsError};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey as WinitNamedKey};
use winit::window::{Window, WindowId};

use crate::input::{action_for_key, KeyCode, NamedKey, SceneAction};
use crate::render::GpuRenderer;
use crate::scene::SceneContext;

/// Raised when no window can be opened; callers fall back to headless mode.
#[derive(Debug, Error)]
pub enum WindowInitError {
    #[error("failed to initialize event loop: {0}")]
    EventLoopPanicked(String),
    #[error("failed to initialize event loop: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("failed to initialize window: {0}")]
    Window(#[from] OsError),
    #[error("failed to initialize renderer: {0}")]
    Renderer(String),
}

impl WindowInitError {
    fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        };
        Self::EventLoopPanicked(message)
    }
}

/// Opens a window and runs the render loop until it is closed. Returns the
/// final scene state.
pub fn run_windowed(scene: SceneContext, key_step: f32) -> Result<SceneContext> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(WindowInitError::from_panic)?
        .map_err(WindowInitError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ShowcaseApp {
        scene,
        key_step,
        renderer: None,
        last_error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|err| anyhow!("event loop failed: {err}"))?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(app.scene)
}

struct ShowcaseApp {
    scene: SceneContext,
    key_step: f32,
    renderer: Option<GpuRenderer>,
    last_error: Option<anyhow::Error>,
}

impl ShowcaseApp {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("glowtext")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(WindowInitError::from)?,
        );
        let size = window.inner_size();
        self.scene.resize(size.width, size.height);
        let renderer = block_on(GpuRenderer::new(window, &self.scene))
            .map_err(|err| WindowInitError::Renderer(format!("{err:#}")))?;
        info!("window ready at {}x{}", size.width, size.height);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        let Some(key) = map_key(&event.logical_key) else {
            return;
        };
        match action_for_key(key, self.key_step) {
            Some(SceneAction::Quit) => event_loop.exit(),
            Some(action) => self.scene.apply(action),
            None => {}
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let frame = self.scene.advance_frame();
        match renderer.render(&frame) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout; retrying next frame");
                Ok(())
            }
            Err(err) => {
                warn!("surface error: {err}; retrying next frame");
                Ok(())
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.last_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for ShowcaseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.renderer.as_ref().map(GpuRenderer::window_id) != Some(id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
                self.scene.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

fn map_key(key: &Key) -> Option<KeyCode> {
    match key {
        Key::Character(text) => KeyCode::from_name(text.as_str()),
        Key::Named(WinitNamedKey::Escape) => Some(KeyCode::Named(NamedKey::Escape)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_logical_keys() {
        assert_eq!(
            map_key(&Key::Character("w".into())),
            Some(KeyCode::Character('W'))
        );
        assert_eq!(
            map_key(&Key::Named(WinitNamedKey::Escape)),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        assert_eq!(map_key(&Key::Named(WinitNamedKey::F1)), None);
        assert_eq!(map_key(&Key::Named(WinitNamedKey::Space)), None);
        assert_eq!(map_key(&Key::Character("1".into())), None);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let err = WindowInitError::from_panic(Box::new("no display"));
        assert_eq!(err.to_string(), "failed to initialize event loop: no display");
        let err = WindowInitError::from_panic(Box::new(String::from("no seat")));
        assert_eq!(err.to_string(), "failed to initialize event loop: no seat");
        let err = WindowInitError::from_panic(Box::new(7_u8));
        assert_eq!(err.to_string(), "failed to initialize event loop: unknown panic");
    }
}
