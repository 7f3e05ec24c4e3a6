//! Free-flying camera driven by input events
//!
//! Key presses and releases add to and subtract from three velocity
//! accumulators (strafe, forward, vertical); each fixed tick moves the camera
//! by whatever the accumulators hold. Holding the look button turns cursor
//! movement into yaw and pitch.
//!
//! # States
//!
//! - **Idle**: cursor movement is ignored
//! - **Looking**: entered on look-button press, left on release. The first
//!   cursor event after entering only records the position, so stale
//!   coordinates never produce a jump.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{DVec2, Vec3};

use super::bindings::{FlyAction, FlyBindings};
use super::camera::{Camera, CameraObject, Perspective};
use crate::core::{CameraConfig, Event, EventBus, EventKind, KeyEvent, MouseButtonEvent, MouseMoveEvent};
use crate::renderer::{DepthRange, RenderBackend};
use crate::scene::{MaterialObject, ObjectKind, SceneObject, Transform};

/// Accumulator magnitudes below this are treated as zero.
const VELOCITY_EPSILON: f32 = 1e-6;

/// Mouse-look state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookState {
    #[default]
    Idle,
    Looking,
}

/// Camera that flies around under keyboard and mouse control.
#[derive(Debug, Clone)]
pub struct FlyingCamera {
    camera: Camera,
    bindings: FlyBindings,
    /// Units per second contributed by one held key
    fly_speed: f32,
    strafe_speed: f32,
    forward_speed: f32,
    up_speed: f32,
    boost_multiplier: f32,
    boosting: bool,
    /// Degrees of rotation per unit of cursor travel
    mouse_sensitivity: f32,
    look: LookState,
    last_mouse: Option<DVec2>,
}

impl FlyingCamera {
    /// Wrap a camera with the default bindings and tuning.
    pub fn new(camera: Camera) -> Self {
        Self::with_config(camera, &CameraConfig::default())
    }

    /// Wrap a camera, taking speeds and sensitivity from `config`.
    pub fn with_config(camera: Camera, config: &CameraConfig) -> Self {
        Self {
            camera,
            bindings: FlyBindings::with_defaults(),
            fly_speed: config.fly_speed,
            strafe_speed: 0.0,
            forward_speed: 0.0,
            up_speed: 0.0,
            boost_multiplier: config.boost_multiplier,
            boosting: false,
            mouse_sensitivity: config.mouse_sensitivity,
            look: LookState::Idle,
            last_mouse: None,
        }
    }

    /// Build the default scene camera from `config` and subscribe it to `bus`.
    pub fn create_default(
        bus: &EventBus,
        config: &CameraConfig,
        width: u32,
        height: u32,
        depth_range: DepthRange,
    ) -> Rc<RefCell<Self>> {
        let mut camera = Camera::new(
            Perspective {
                fov_degrees: config.fov_degrees,
                width,
                height,
                near: config.near,
                far: config.far,
            },
            depth_range,
        );
        camera.set_position(config.position);

        let flying = Rc::new(RefCell::new(Self::with_config(camera, config)));
        Self::attach(&flying, bus);
        flying
    }

    /// Subscribe to key, mouse button and cursor events. The subscriptions
    /// hold a weak reference and go quiet once the camera is dropped.
    pub fn attach(camera: &Rc<RefCell<Self>>, bus: &EventBus) {
        for kind in [EventKind::KeyPressed, EventKind::MouseButton, EventKind::MouseMoved] {
            let weak: Weak<RefCell<Self>> = Rc::downgrade(camera);
            bus.subscribe(kind, move |event| {
                if let Some(camera) = weak.upgrade() {
                    camera.borrow_mut().handle_event(event);
                }
            });
        }
    }

    /// Route an input event to the matching handler.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::KeyPressed(key) => self.process_key(*key),
            Event::MouseButton(button) => self.process_mouse_button(*button),
            Event::MouseMoved(position) => self.process_mouse_moved(*position),
            Event::ObjectAddedToScene(_) => {}
        }
    }

    /// Apply a key press or release to the velocity accumulators.
    pub fn process_key(&mut self, event: KeyEvent) {
        let Some(action) = self.bindings.action(event.key) else {
            return;
        };

        let step = if event.pressed { self.fly_speed } else { -self.fly_speed };
        match action {
            FlyAction::StrafeRight => self.strafe_speed += step,
            FlyAction::StrafeLeft => self.strafe_speed -= step,
            FlyAction::Forward => self.forward_speed -= step,
            FlyAction::Back => self.forward_speed += step,
            FlyAction::Up => self.up_speed += step,
            FlyAction::Boost => self.boosting = event.pressed,
        }

        for speed in [&mut self.strafe_speed, &mut self.forward_speed, &mut self.up_speed] {
            if speed.abs() < VELOCITY_EPSILON {
                *speed = 0.0;
            }
        }
    }

    /// Enter or leave the looking state on the look button.
    pub fn process_mouse_button(&mut self, event: MouseButtonEvent) {
        if event.button != self.bindings.look_button() {
            return;
        }

        self.last_mouse = None;
        self.look = if event.pressed {
            LookState::Looking
        } else {
            LookState::Idle
        };
    }

    /// Turn cursor travel into yaw and pitch while looking.
    pub fn process_mouse_moved(&mut self, event: MouseMoveEvent) {
        if self.look != LookState::Looking {
            return;
        }

        let position = DVec2::new(event.x, event.y);
        let Some(last) = self.last_mouse.replace(position) else {
            return;
        };

        let delta = last - position;
        if delta.x != 0.0 {
            let angle = delta.x as f32 * self.mouse_sensitivity;
            self.camera.rotate_left_right(angle);
            self.camera.record_rotation(angle, 0.0);
        }
        if delta.y != 0.0 {
            let angle = delta.y as f32 * self.mouse_sensitivity;
            if self.camera.rotate_up_down(angle) {
                self.camera.record_rotation(0.0, angle);
            }
        }
        self.camera.refresh_view();
    }

    /// Current velocity as (strafe, up, forward) in units per second,
    /// including boost.
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(self.strafe_speed, self.up_speed, self.forward_speed) * self.boost_factor()
    }

    fn boost_factor(&self) -> f32 {
        if self.boosting { self.boost_multiplier } else { 1.0 }
    }

    pub fn fly_speed(&self) -> f32 {
        self.fly_speed
    }

    pub fn set_fly_speed(&mut self, fly_speed: f32) {
        self.fly_speed = fly_speed;
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    pub fn boost_multiplier(&self) -> f32 {
        self.boost_multiplier
    }

    pub fn set_boost_multiplier(&mut self, multiplier: f32) {
        self.boost_multiplier = multiplier;
    }

    pub fn is_boosting(&self) -> bool {
        self.boosting
    }

    pub fn look_state(&self) -> LookState {
        self.look
    }

    pub fn bindings(&self) -> &FlyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut FlyBindings {
        &mut self.bindings
    }
}

impl SceneObject for FlyingCamera {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Camera
    }

    /// Move by one tick's worth of the accumulated velocity.
    fn update(&mut self, _time: f64, tick_ms: f32) {
        let velocity = self.velocity() * (tick_ms / 1000.0);

        if velocity.x != 0.0 {
            self.camera.move_right(velocity.x);
        }
        if velocity.z != 0.0 {
            self.camera.move_forward(velocity.z);
        }
        if velocity.y != 0.0 {
            self.camera.move_up(velocity.y);
        }
    }

    fn render(&mut self, _time: f32, _frame_ms: f32, backend: &mut dyn RenderBackend) {
        self.camera.apply(backend);
    }
}

impl MaterialObject for FlyingCamera {
    fn transform(&self) -> &Transform {
        self.camera.transform()
    }

    fn set_position(&mut self, position: Vec3) {
        self.camera.set_position(position);
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.camera.set_rotation(rotation);
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.camera.set_scale(scale);
    }
}

impl CameraObject for FlyingCamera {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;
    use winit::event::MouseButton;
    use winit::keyboard::KeyCode;

    use super::*;

    const EPS: f32 = 1e-5;

    fn flying() -> FlyingCamera {
        let camera = Camera::new(
            Perspective {
                fov_degrees: 35.0,
                width: 800,
                height: 600,
                near: 0.1,
                far: 100.0,
            },
            DepthRange::ZeroToOne,
        );
        let mut flying = FlyingCamera::new(camera);
        flying.set_fly_speed(1.0);
        flying.set_mouse_sensitivity(0.15);
        flying
    }

    fn key(flying: &mut FlyingCamera, key: KeyCode, pressed: bool) {
        flying.process_key(KeyEvent::new(key, pressed));
    }

    fn look(flying: &mut FlyingCamera, pressed: bool) {
        flying.process_mouse_button(MouseButtonEvent::new(MouseButton::Right, pressed));
    }

    fn cursor(flying: &mut FlyingCamera, x: f64, y: f64) {
        flying.process_mouse_moved(MouseMoveEvent::new(x, y));
    }

    #[test]
    fn test_press_release_restores_zero() {
        let mut flying = flying();
        key(&mut flying, KeyCode::KeyD, true);
        key(&mut flying, KeyCode::KeyW, true);
        assert_eq!(flying.velocity(), Vec3::new(1.0, 0.0, -1.0));

        key(&mut flying, KeyCode::KeyD, false);
        key(&mut flying, KeyCode::KeyW, false);
        assert_eq!(flying.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut flying = flying();
        key(&mut flying, KeyCode::KeyA, true);
        key(&mut flying, KeyCode::ArrowRight, true);
        assert_eq!(flying.velocity().x, 0.0);
    }

    #[test]
    fn test_update_scales_by_tick() {
        let mut flying = flying();
        key(&mut flying, KeyCode::Space, true);
        key(&mut flying, KeyCode::KeyS, true);

        flying.update(0.0, 50.0);

        // Back moves along +direction, direction is -Z.
        assert!(flying.position().abs_diff_eq(Vec3::new(0.0, 0.05, -0.05), EPS));
    }

    #[test]
    fn test_forward_and_back_relative_to_view() {
        let ahead = Vec3::new(0.0, 0.0, -10.0);

        let mut default_keys = flying();
        key(&mut default_keys, KeyCode::KeyW, true);
        default_keys.update(0.0, 50.0);
        assert!(default_keys.position().distance(ahead) > 10.0);

        let mut view_keys = flying();
        *view_keys.bindings_mut() = FlyBindings::toward_view();
        key(&mut view_keys, KeyCode::KeyW, true);
        view_keys.update(0.0, 50.0);
        assert!(view_keys.position().distance(ahead) < 10.0);
    }

    #[test]
    fn test_boost_applies_only_at_integration() {
        let mut flying = flying();
        flying.set_boost_multiplier(10.0);

        // Boost with no motion still affects a later key.
        key(&mut flying, KeyCode::ShiftLeft, true);
        assert_eq!(flying.velocity(), Vec3::ZERO);
        key(&mut flying, KeyCode::KeyD, true);
        assert_eq!(flying.velocity().x, 10.0);

        // Release order does not matter.
        key(&mut flying, KeyCode::KeyD, false);
        key(&mut flying, KeyCode::ShiftLeft, false);
        assert_eq!(flying.velocity(), Vec3::ZERO);
        assert!(!flying.is_boosting());
    }

    #[test]
    fn test_missed_boost_press_does_not_corrupt_velocity() {
        let mut flying = flying();
        key(&mut flying, KeyCode::KeyD, true);
        key(&mut flying, KeyCode::ShiftLeft, false);
        key(&mut flying, KeyCode::ShiftLeft, false);
        assert_eq!(flying.velocity().x, 1.0);
    }

    #[test]
    fn test_unbound_key_ignored() {
        let mut flying = flying();
        key(&mut flying, KeyCode::KeyQ, true);
        assert_eq!(flying.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_cursor_ignored_while_idle() {
        let mut flying = flying();
        let before = flying.camera().direction();
        cursor(&mut flying, 10.0, 10.0);
        cursor(&mut flying, 50.0, 80.0);
        assert_eq!(flying.camera().direction(), before);
        assert_eq!(flying.look_state(), LookState::Idle);
    }

    #[test]
    fn test_first_move_seeds_then_second_rotates() {
        let mut flying = flying();
        look(&mut flying, true);
        assert_eq!(flying.look_state(), LookState::Looking);

        let before = flying.camera().direction();
        cursor(&mut flying, 100.0, 100.0);
        assert_eq!(flying.camera().direction(), before);

        cursor(&mut flying, 95.0, 100.0);
        let expected = Quat::from_axis_angle(Vec3::Y, 0.75_f32.to_radians()) * before;
        assert!(flying.camera().direction().abs_diff_eq(expected, EPS));
        assert!((flying.transform().rotation.x - 0.75).abs() < EPS);
        assert_eq!(flying.transform().rotation.y, 0.0);
    }

    #[test]
    fn test_release_resets_last_position() {
        let mut flying = flying();
        look(&mut flying, true);
        cursor(&mut flying, 100.0, 100.0);
        look(&mut flying, false);
        assert_eq!(flying.look_state(), LookState::Idle);

        look(&mut flying, true);
        let before = flying.camera().direction();
        // Far from the old position: must only seed.
        cursor(&mut flying, 600.0, 20.0);
        assert_eq!(flying.camera().direction(), before);
    }

    #[test]
    fn test_vertical_cursor_pitches_with_clamp() {
        let mut flying = flying();
        look(&mut flying, true);
        cursor(&mut flying, 0.0, 100.0);
        cursor(&mut flying, 0.0, 0.0);
        // 100 * 0.15 = 15 degrees up.
        assert!((flying.camera().pitch_degrees() - 15.0).abs() < 1e-2);

        let accepted = flying.camera().direction();
        cursor(&mut flying, 0.0, -1000.0);
        assert_eq!(flying.camera().direction(), accepted);
        assert!((flying.transform().rotation.y - 15.0).abs() < EPS);
    }

    #[test]
    fn test_other_buttons_do_not_toggle_look() {
        let mut flying = flying();
        flying.process_mouse_button(MouseButtonEvent::new(MouseButton::Left, true));
        assert_eq!(flying.look_state(), LookState::Idle);
    }

    #[test]
    fn test_attached_camera_reacts_to_bus() {
        let bus = EventBus::new();
        let config = CameraConfig {
            fly_speed: 2.0,
            ..Default::default()
        };
        let camera = FlyingCamera::create_default(&bus, &config, 800, 600, DepthRange::ZeroToOne);

        bus.publish(&Event::KeyPressed(KeyEvent::new(KeyCode::KeyD, true)));
        assert_eq!(camera.borrow().velocity().x, 2.0);

        drop(camera);
        // Dropped camera: subscription stays but does nothing.
        bus.publish(&Event::KeyPressed(KeyEvent::new(KeyCode::KeyD, false)));
        assert_eq!(bus.subscriber_count(EventKind::KeyPressed), 1);
    }
}
