//! Key bindings for the flying camera
//!
//! Physical keys map to logical fly actions, so the camera never looks at a
//! device key code directly and controls can be rebound at runtime.

use rustc_hash::FxHashMap;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Logical actions the flying camera reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlyAction {
    StrafeRight,
    StrafeLeft,
    /// Decreases the forward accumulator, moving the camera away from its
    /// view direction
    Forward,
    /// Moves the camera along its view direction
    Back,
    Up,
    /// Speed multiplier while held
    Boost,
}

/// Maps keys to [`FlyAction`]s, plus the mouse button that enables mouse-look.
#[derive(Debug, Clone)]
pub struct FlyBindings {
    key_bindings: FxHashMap<KeyCode, FlyAction>,
    look_button: MouseButton,
}

impl FlyBindings {
    /// Bindings with nothing mapped and right-button look
    #[must_use]
    pub fn empty() -> Self {
        Self {
            key_bindings: FxHashMap::default(),
            look_button: MouseButton::Right,
        }
    }

    /// WASD + arrows, Space to rise, left Shift to boost.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut bindings = Self::empty();

        bindings.bind(KeyCode::KeyD, FlyAction::StrafeRight);
        bindings.bind(KeyCode::KeyA, FlyAction::StrafeLeft);
        bindings.bind(KeyCode::KeyW, FlyAction::Forward);
        bindings.bind(KeyCode::KeyS, FlyAction::Back);

        bindings.bind(KeyCode::ArrowRight, FlyAction::StrafeRight);
        bindings.bind(KeyCode::ArrowLeft, FlyAction::StrafeLeft);
        bindings.bind(KeyCode::ArrowUp, FlyAction::Forward);
        bindings.bind(KeyCode::ArrowDown, FlyAction::Back);

        bindings.bind(KeyCode::Space, FlyAction::Up);
        bindings.bind(KeyCode::ShiftLeft, FlyAction::Boost);

        bindings
    }

    /// Like [`with_defaults`](Self::with_defaults), but W and Up move the
    /// camera toward what it is looking at, and S and Down move it away.
    #[must_use]
    pub fn toward_view() -> Self {
        let mut bindings = Self::with_defaults();
        for key in [KeyCode::KeyW, KeyCode::ArrowUp] {
            bindings.bind(key, FlyAction::Back);
        }
        for key in [KeyCode::KeyS, KeyCode::ArrowDown] {
            bindings.bind(key, FlyAction::Forward);
        }
        bindings
    }

    /// Bind a key, replacing any previous binding for it.
    pub fn bind(&mut self, key: KeyCode, action: FlyAction) {
        self.key_bindings.insert(key, action);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.key_bindings.remove(&key);
    }

    #[must_use]
    pub fn action(&self, key: KeyCode) -> Option<FlyAction> {
        self.key_bindings.get(&key).copied()
    }

    pub fn set_look_button(&mut self, button: MouseButton) {
        self.look_button = button;
    }

    #[must_use]
    pub fn look_button(&self) -> MouseButton {
        self.look_button
    }

    /// Keys bound to `action`, in no particular order.
    pub fn keys_for(&self, action: FlyAction) -> impl Iterator<Item = KeyCode> + '_ {
        self.key_bindings
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| *k)
    }
}

impl Default for FlyBindings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_both_layouts() {
        let bindings = FlyBindings::with_defaults();
        assert_eq!(bindings.action(KeyCode::KeyW), Some(FlyAction::Forward));
        assert_eq!(bindings.action(KeyCode::ArrowUp), Some(FlyAction::Forward));
        assert_eq!(bindings.action(KeyCode::ShiftLeft), Some(FlyAction::Boost));
        assert_eq!(bindings.action(KeyCode::KeyQ), None);
        assert_eq!(bindings.keys_for(FlyAction::StrafeLeft).count(), 2);
        assert_eq!(bindings.look_button(), MouseButton::Right);
    }

    #[test]
    fn test_toward_view_swaps_forward_and_back() {
        let bindings = FlyBindings::toward_view();
        assert_eq!(bindings.action(KeyCode::KeyW), Some(FlyAction::Back));
        assert_eq!(bindings.action(KeyCode::ArrowDown), Some(FlyAction::Forward));
        assert_eq!(bindings.action(KeyCode::KeyA), Some(FlyAction::StrafeLeft));
    }

    #[test]
    fn test_rebind_replaces() {
        let mut bindings = FlyBindings::with_defaults();
        bindings.bind(KeyCode::KeyW, FlyAction::Up);
        assert_eq!(bindings.action(KeyCode::KeyW), Some(FlyAction::Up));

        bindings.unbind(KeyCode::KeyW);
        assert_eq!(bindings.action(KeyCode::KeyW), None);
    }
}
