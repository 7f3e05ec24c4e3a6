//! Models: several meshes sharing one transform

use glam::Vec3;

use super::mesh::Mesh;
use super::object::{MaterialObject, MeshCounts, ObjectKind, SceneObject};
use super::transform::Transform;
use crate::renderer::RenderBackend;

/// A group of meshes placed, rotated and scaled as one.
///
/// Transform setters propagate to every mesh, so each mesh always draws with
/// the model's transform.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    meshes: Vec<Mesh>,
    transform: Transform,
}

impl Model {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform: Transform::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Append a mesh, moving it onto the model's transform.
    pub fn push(&mut self, mut mesh: Mesh) {
        mesh.set_position(self.transform.position);
        mesh.set_rotation(self.transform.rotation);
        mesh.set_scale(self.transform.scale);
        self.meshes.push(mesh);
    }

    /// Take out the mesh at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Mesh> {
        (index < self.meshes.len()).then(|| self.meshes.remove(index))
    }

    /// Set the texture of every mesh
    pub fn set_texture(&mut self, texture: &str) {
        for mesh in &mut self.meshes {
            mesh.set_texture(texture);
        }
    }
}

impl SceneObject for Model {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Model
    }

    fn update(&mut self, time: f64, tick_ms: f32) {
        for mesh in &mut self.meshes {
            mesh.update(time, tick_ms);
        }
    }

    fn render(&mut self, time: f32, frame_ms: f32, backend: &mut dyn RenderBackend) {
        for mesh in &mut self.meshes {
            mesh.render(time, frame_ms, backend);
        }
    }

    fn mesh_counts(&self) -> Option<MeshCounts> {
        Some(self.meshes.iter().filter_map(Mesh::mesh_counts).sum())
    }
}

impl MaterialObject for Model {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        for mesh in &mut self.meshes {
            mesh.set_position(position);
        }
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        for mesh in &mut self.meshes {
            mesh.set_rotation(rotation);
        }
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        for mesh in &mut self.meshes {
            mesh.set_scale(scale);
        }
    }
}
