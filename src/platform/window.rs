//! Windowed runner on winit
//!
//! Translates window input into bus events and drives one engine frame per
//! redraw. Key repeats are dropped; releasing Escape closes the window.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::core::{Engine, EngineError, Event, KeyEvent, MouseButtonEvent, MouseMoveEvent};
use crate::renderer::RenderBackend;

struct WindowApp<B: RenderBackend> {
    engine: Engine<B>,
    window: Option<Arc<Window>>,
    error: Option<EngineError>,
}

impl<B: RenderBackend> WindowApp<B> {
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.engine.shutdown();
        event_loop.exit();
    }
}

impl<B: RenderBackend> ApplicationHandler for WindowApp<B> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.engine.config();
        let window_attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                self.error = Some(EngineError::EventLoop(e.to_string()));
                self.close(event_loop);
                return;
            }
        };

        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );
        self.engine.reset_clock(Instant::now());
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.close(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                log::debug!("Resized to {}x{}", new_size.width, new_size.height);
                self.engine.resize(new_size.width, new_size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    self.engine
                        .bus()
                        .publish(&Event::KeyPressed(KeyEvent::new(key, pressed)));

                    if key == KeyCode::Escape && !pressed {
                        log::info!("Escape released, shutting down");
                        self.close(event_loop);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                self.engine
                    .bus()
                    .publish(&Event::MouseButton(MouseButtonEvent::new(button, pressed)));
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.engine
                    .bus()
                    .publish(&Event::MouseMoved(MouseMoveEvent::new(position.x, position.y)));
            }

            WindowEvent::RedrawRequested => {
                if !self.engine.is_shut_down() {
                    self.engine.frame();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open a window and run `engine` until it is closed.
///
/// # Errors
///
/// Returns [`EngineError::EventLoop`] if the event loop or the window cannot
/// be created, or the loop exits with an error.
pub fn run<B: RenderBackend>(engine: Engine<B>) -> Result<(), EngineError> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let event_loop = EventLoop::new().map_err(|e| EngineError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = WindowApp {
        engine,
        window: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| EngineError::EventLoop(e.to_string()))?;

    // Covers loops that end without a close request.
    app.engine.shutdown();

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
