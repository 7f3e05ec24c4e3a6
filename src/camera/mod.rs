//! Camera module
//!
//! The base perspective camera and the input-driven flying camera.

mod bindings;
#[allow(clippy::module_inception)]
mod camera;
mod flying;

pub use bindings::{FlyAction, FlyBindings};
pub use camera::{
    CAMERA_VIEW_ID, Camera, CameraObject, MAX_PITCH_DEGREES, Perspective, perspective_lh,
};
pub use flying::{FlyingCamera, LookState};
