//! A minimal real-time 3D scene engine
//!
//! This engine provides:
//! - A fixed-timestep update loop under a variable-rate render loop
//! - A scene registry with deferred add/remove
//! - An event bus decoupling input devices from gameplay code
//! - A fly-style camera driven by keyboard and mouse
//! - A render backend seam and glTF mesh import
//! - A winit windowed runner

pub mod assets;
pub mod camera;
pub mod core;
pub mod platform;
pub mod renderer;
pub mod scene;

// Re-exports for convenience
pub use glam;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::{AssetError, AssetLoader, GltfLoader};
    pub use crate::camera::{Camera, CameraObject, FlyAction, FlyBindings, FlyingCamera};
    pub use crate::core::{
        CameraConfig, Engine, EngineConfig, EngineError, Event, EventBus, EventKind, FrameStats,
        TickPolicy,
    };
    pub use crate::platform::{HeadlessPlatform, Platform};
    pub use crate::renderer::{DepthRange, NullBackend, RenderBackend};
    pub use crate::scene::{
        CameraHandle, Group, LineStrip, MaterialObject, Mesh, MeshInfo, Model, ObjectHandle,
        Scene, SceneObject,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
