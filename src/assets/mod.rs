//! Asset loading
//!
//! Loaders turn files on disk into meshes and models. Loading happens before
//! the frame loop starts; failures are returned to the caller and never
//! retried.

mod gltf_loader;
mod loader;

pub use gltf_loader::GltfLoader;
pub use loader::{AssetError, AssetLoader};
