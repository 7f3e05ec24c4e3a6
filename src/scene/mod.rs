//! Scene graph
//!
//! Scene objects, the concrete object variants, and the registry that owns them.

mod group;
mod line_strip;
mod mesh;
mod model;
mod object;
#[allow(clippy::module_inception)]
mod scene;
mod transform;

pub use group::Group;
pub use line_strip::{LineStrip, MAX_STRIP_POINTS};
pub use mesh::{Mesh, MeshInfo, Vertex};
pub use model::Model;
pub use object::{MaterialObject, MeshCounts, ObjectHandle, ObjectId, ObjectKind, SceneObject};
pub use scene::{CameraHandle, Scene, SceneStats};
pub use transform::Transform;
