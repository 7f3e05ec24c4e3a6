//! Core Engine struct and main loop

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use crate::core::config::{ConfigError, EngineConfig};
use crate::core::debug::FrameStats;
use crate::core::events::EventBus;
use crate::core::scheduler::{FrameReport, FrameScheduler};
use crate::core::time::Time;
use crate::platform::Platform;
use crate::renderer::RenderBackend;
use crate::scene::Scene;

/// Errors that can stop the engine from starting or running
#[derive(Debug)]
pub enum EngineError {
    /// The window event loop failed
    EventLoop(String),
    /// The configuration was rejected
    Config(ConfigError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventLoop(e) => write!(f, "Event loop error: {e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::EventLoop(_) => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Main engine struct
///
/// Owns the event bus, the current scene and the render backend, and runs
/// the fixed-update / variable-render loop over them.
pub struct Engine<B: RenderBackend> {
    config: EngineConfig,
    bus: Rc<EventBus>,
    scene: Option<Scene>,
    backend: B,
    scheduler: FrameScheduler,
    time: Time,
    stats: FrameStats,
    shut_down: bool,
}

impl<B: RenderBackend> Engine<B> {
    /// Create an engine drawing through `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `config` fails validation.
    pub fn new(config: EngineConfig, backend: B) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Starting engine: {} ({} backend, {} updates/s, {:?})",
            config.title,
            backend.name(),
            config.updates_per_second,
            config.tick_policy
        );

        let scheduler = FrameScheduler::new(config.updates_per_second, config.tick_policy)
            .with_max_updates_per_frame(config.max_updates_per_frame);

        Ok(Self {
            config,
            bus: Rc::new(EventBus::new()),
            scene: None,
            backend,
            scheduler,
            time: Time::new(),
            stats: FrameStats::new(),
            shut_down: false,
        })
    }

    /// Build a scene with the default flying camera and make it current.
    pub fn create_scene(&mut self, name: impl Into<String>) -> &mut Scene {
        let scene = Scene::new(name, Rc::clone(&self.bus), &self.config, &self.backend);
        self.scene.insert(scene)
    }

    /// Make `scene` current, returning the previous one.
    pub fn set_scene(&mut self, scene: Scene) -> Option<Scene> {
        log::info!("Switching to scene '{}'", scene.name());
        self.scene.replace(scene)
    }

    pub fn take_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Restart the clock at `now`.
    pub fn reset_clock(&mut self, now: Instant) {
        self.time = Time::starting_at(now);
    }

    /// Run one loop iteration against the wall clock.
    pub fn frame(&mut self) -> FrameReport {
        self.frame_at(Instant::now())
    }

    /// Run one loop iteration ending at `now`: the due fixed updates, one
    /// render, then hand the frame to the backend.
    pub fn frame_at(&mut self, now: Instant) -> FrameReport {
        self.time.update_to(now);
        let frame_ms = self.time.delta_ms();
        let elapsed = self.time.elapsed_seconds();

        let report = match &mut self.scene {
            Some(scene) => self
                .scheduler
                .run_frame(scene, &mut self.backend, elapsed, frame_ms),
            None => FrameReport::default(),
        };
        self.backend.frame();

        self.stats.record_frame(frame_ms, report.updates);
        log::trace!(
            "Frame {} took {frame_ms:.2}ms, {} updates",
            self.time.frame_count(),
            report.updates
        );
        report
    }

    /// Drive frames from `platform` until it requests close, then shut down.
    pub fn run(&mut self, platform: &mut impl Platform) {
        self.reset_clock(platform.now());

        while !platform.close_requested() {
            platform.poll_events(&self.bus);
            self.frame_at(platform.now());
        }

        self.shutdown();
        platform.shutdown();
    }

    /// Resize the viewport of the current scene's camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(scene) = &mut self.scene {
            scene.resize(width, height);
        }
    }

    /// Hand off to the backend for teardown. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        log::info!("Shutting down: {}", self.stats.format_stats());
        if let Some(scene) = &self.scene {
            log::info!("Scene '{}' {}", scene.name(), scene.stats());
        }
        self.backend.shutdown();
    }
}

impl<B: RenderBackend> fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("title", &self.config.title)
            .field("backend", &self.backend.name())
            .field("scene", &self.scene)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use glam::Vec3;
    use winit::event::MouseButton;
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::camera::{Camera, CameraObject, Perspective};
    use crate::core::{Event, EventKind, KeyEvent, MouseButtonEvent, MouseMoveEvent, TickPolicy};
    use crate::platform::HeadlessPlatform;
    use crate::renderer::{DepthRange, RecordingBackend};
    use crate::scene::{CameraHandle, MaterialObject, Mesh, ObjectHandle};

    fn engine(depth: DepthRange) -> Engine<RecordingBackend> {
        Engine::new(EngineConfig::default(), RecordingBackend::new(depth)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_updates_per_second(0);
        let result = Engine::new(config, RecordingBackend::new(DepthRange::ZeroToOne));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_scene_camera_uses_backend_depth_range() {
        let mut engine = engine(DepthRange::NegativeOneToOne);
        let scene = engine.create_scene("Depth");
        assert_eq!(
            scene.camera().borrow().camera().depth_range(),
            DepthRange::NegativeOneToOne
        );
    }

    #[test]
    fn test_run_drives_updates_and_renders() {
        let mut engine = engine(DepthRange::ZeroToOne);
        engine
            .create_scene("Loop")
            .add(ObjectHandle::new(Mesh::cube()));

        let mut platform = HeadlessPlatform::new().with_frames(3, 20.0);
        engine.run(&mut platform);

        assert_eq!(engine.scheduler().total_updates(), 1);
        assert_eq!(engine.stats().total_frames(), 3);
        assert_eq!(engine.backend().frames, 3);
        // The cube only becomes live at the first update, on the third frame.
        assert_eq!(engine.backend().labels(), vec!["cube"]);
        assert!(engine.backend().shut_down);
        assert!(engine.is_shut_down());
        assert!(platform.is_shut_down());
    }

    #[test]
    fn test_frame_without_scene() {
        let mut engine = engine(DepthRange::ZeroToOne);
        let start = Instant::now();
        engine.reset_clock(start);
        let report = engine.frame_at(start + std::time::Duration::from_millis(100));
        assert_eq!(report.updates, 0);
        assert_eq!(engine.backend().frames, 1);
    }

    #[test]
    fn test_input_moves_camera() {
        let mut engine = engine(DepthRange::ZeroToOne);
        engine.create_scene("Fly");

        // Hold "back" for one tick. Back adds to the forward accumulator,
        // moving the camera along its view direction (-Z).
        let mut platform = HeadlessPlatform::new()
            .with_frame(50.0, Vec::new())
            .with_frame(50.0, vec![Event::KeyPressed(KeyEvent::new(KeyCode::KeyS, true))]);
        engine.run(&mut platform);

        let scene = engine.scene().unwrap();
        let position = scene.camera().borrow().position();
        assert!((position - Vec3::new(0.0, 0.0, -0.05)).length() < 1e-5, "{position}");
    }

    #[test]
    fn test_mouse_look_through_bus() {
        let mut engine = engine(DepthRange::ZeroToOne);
        engine.create_scene("Look");
        let before = engine.scene().unwrap().camera().borrow().camera().direction();

        let mut platform = HeadlessPlatform::new().with_frame(
            16.0,
            vec![
                Event::MouseButton(MouseButtonEvent::new(MouseButton::Right, true)),
                Event::MouseMoved(MouseMoveEvent::new(100.0, 100.0)),
                Event::MouseMoved(MouseMoveEvent::new(95.0, 100.0)),
            ],
        );
        engine.run(&mut platform);

        let after = engine.scene().unwrap().camera().borrow().camera().direction();
        let angle = before.angle_between(after).to_degrees();
        assert!((angle - 0.75).abs() < 1e-3, "{angle}");
    }

    #[test]
    fn test_replace_camera_announces_immediately() {
        let mut engine = engine(DepthRange::ZeroToOne);
        engine.create_scene("Swap");
        let mut platform = HeadlessPlatform::new().with_frames(1, 50.0);
        engine.run(&mut platform);

        let announced = Rc::new(Cell::new(0));
        let seen = Rc::clone(&announced);
        engine
            .bus()
            .subscribe(EventKind::ObjectAddedToScene, move |_| seen.set(seen.get() + 1));

        let camera = Camera::new(
            Perspective {
                fov_degrees: 45.0,
                width: 800,
                height: 600,
                near: 0.1,
                far: 10.0,
            },
            DepthRange::ZeroToOne,
        );
        let replacement = CameraHandle::new(Rc::new(std::cell::RefCell::new(camera)));
        let scene = engine.scene_mut().unwrap();
        let old = scene.camera().handle().clone();
        scene.replace_camera(replacement.clone());
        assert_eq!(announced.get(), 1);

        scene.update(0.0, 50.0);
        assert!(!scene.contains(&old));
        assert!(scene.contains(replacement.handle()));
    }

    #[test]
    fn test_reset_policy_from_config() {
        let config = EngineConfig::default().with_tick_policy(TickPolicy::Reset);
        let mut engine = Engine::new(config, RecordingBackend::new(DepthRange::ZeroToOne)).unwrap();
        engine.create_scene("Reset");

        let mut platform = HeadlessPlatform::new().with_frames(2, 120.0);
        engine.run(&mut platform);

        assert_eq!(engine.scheduler().total_updates(), 2);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut engine = engine(DepthRange::ZeroToOne);
        engine.shutdown();
        engine.shutdown();
        assert!(engine.backend().shut_down);
    }
}
