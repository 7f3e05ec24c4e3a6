//! Rendering module
//!
//! The backend seam scene objects draw through, plus GPU-less backends for
//! headless runs and tests.

mod backend;
mod headless;

pub use backend::{DepthRange, DrawCall, RenderBackend, ShaderPair, Topology};
pub use headless::{DrawRecord, NullBackend, RecordingBackend};
