//! Mesh and vertex definitions

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::object::{MaterialObject, MeshCounts, ObjectKind, SceneObject};
use super::transform::Transform;
use crate::camera::CAMERA_VIEW_ID;
use crate::renderer::{DrawCall, RenderBackend, ShaderPair, Topology};

/// Vertex with position, normal, and UV coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Vertex with only a position
    pub const fn at(position: [f32; 3]) -> Self {
        Self::new(position, [0.0; 3], [0.0; 2])
    }
}

/// How a mesh is to be drawn, and how loaders should build it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshInfo {
    /// Program to draw with, `None` for the backend default
    pub shaders: Option<ShaderPair>,
    /// Texture name, used when `use_texture` is set
    pub texture: Option<String>,
    /// Flat color, RGBA
    pub color: Option<[f32; 4]>,
    /// Vertices carry their own color
    pub vertex_with_color: bool,
    pub use_texture: bool,
    pub use_normals: bool,
    pub topology: Topology,
}

impl Default for MeshInfo {
    fn default() -> Self {
        Self {
            shaders: None,
            texture: None,
            color: None,
            vertex_with_color: false,
            use_texture: true,
            use_normals: false,
            topology: Topology::TriangleStrip,
        }
    }
}

impl MeshInfo {
    /// Textured, lit triangles: the default for imported models
    pub fn textured() -> Self {
        Self {
            shaders: Some(ShaderPair::new("vs_textured", "fs_textured")),
            use_texture: true,
            use_normals: true,
            topology: Topology::Triangles,
            ..Default::default()
        }
    }

    /// Untextured flat color
    pub fn flat_color(color: [f32; 4]) -> Self {
        Self {
            shaders: Some(ShaderPair::new("vs_simple_color", "fs_simple_color")),
            color: Some(color),
            use_texture: false,
            ..Default::default()
        }
    }

    pub fn with_shaders(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.shaders = Some(ShaderPair::new(vertex, fragment));
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self.use_texture = true;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_normals(mut self, use_normals: bool) -> Self {
        self.use_normals = use_normals;
        self
    }
}

/// A drawable piece of geometry with its own transform
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    info: MeshInfo,
    transform: Transform,
}

impl Mesh {
    /// Create a mesh from vertices and indices
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>, info: MeshInfo) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            info,
            transform: Transform::default(),
        }
    }

    /// Build a mesh from separate attribute streams.
    ///
    /// Missing normals or UVs are zero-filled. Without indices, vertices are
    /// drawn in order.
    pub fn from_data(
        name: impl Into<String>,
        positions: &[[f32; 3]],
        normals: Option<&[[f32; 3]]>,
        uvs: Option<&[[f32; 2]]>,
        indices: Option<Vec<u32>>,
        info: MeshInfo,
    ) -> Self {
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = normals.and_then(|n| n.get(i)).copied().unwrap_or_default();
                let uv = uvs.and_then(|t| t.get(i)).copied().unwrap_or_default();
                Vertex::new(position, normal, uv)
            })
            .collect::<Vec<_>>();
        let indices = indices.unwrap_or_else(|| (0..vertices.len() as u32).collect());
        Self::new(name, vertices, indices, info)
    }

    /// Create a unit cube centered at origin
    pub fn cube() -> Self {
        let vertices = vec![
            // Front face
            Vertex::new([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
            // Back face
            Vertex::new([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
            // Top face
            Vertex::new([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
            // Bottom face
            Vertex::new([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
            // Right face
            Vertex::new([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
            // Left face
            Vertex::new([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        ];

        let indices = vec![
            0, 1, 2, 2, 3, 0, // Front
            4, 5, 6, 6, 7, 4, // Back
            8, 9, 10, 10, 11, 8, // Top
            12, 13, 14, 14, 15, 12, // Bottom
            16, 17, 18, 18, 19, 16, // Right
            20, 21, 22, 22, 23, 20, // Left
        ];

        let info = MeshInfo::default()
            .with_topology(Topology::Triangles)
            .with_normals(true);
        Self::new("cube", vertices, indices, info)
    }

    /// Create a plane on the XZ axis
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Vertex::new([-half, 0.0, half], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([half, 0.0, half], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([half, 0.0, -half], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-half, 0.0, -half], [0.0, 1.0, 0.0], [0.0, 1.0]),
        ];

        let indices = vec![0, 1, 2, 2, 3, 0];

        let info = MeshInfo::default()
            .with_topology(Topology::Triangles)
            .with_normals(true);
        Self::new("plane", vertices, indices, info)
    }

    /// A colored line segment
    pub fn line(start: Vec3, end: Vec3, color: [f32; 4]) -> Self {
        let vertices = vec![Vertex::at(start.into()), Vertex::at(end.into())];
        let info = MeshInfo::flat_color(color).with_topology(Topology::Lines);
        Self::new("line", vertices, vec![0, 1], info)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex data as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn info(&self) -> &MeshInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut MeshInfo {
        &mut self.info
    }

    pub fn set_texture(&mut self, texture: impl Into<String>) {
        self.info.texture = Some(texture.into());
        self.info.use_texture = true;
    }

    /// Submit this mesh with an explicit model matrix.
    pub(crate) fn submit(&self, transform: glam::Mat4, backend: &mut dyn RenderBackend) {
        let texture = if self.info.use_texture {
            self.info.texture.as_deref()
        } else {
            None
        };

        backend.submit(&DrawCall {
            label: &self.name,
            view_id: CAMERA_VIEW_ID,
            transform,
            vertex_data: self.vertex_bytes(),
            vertex_count: self.vertices.len() as u32,
            indices: &self.indices,
            topology: self.info.topology,
            shaders: self.info.shaders.as_ref(),
            texture,
            color: self.info.color,
        });
    }
}

impl SceneObject for Mesh {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Mesh
    }

    fn render(&mut self, _time: f32, _frame_ms: f32, backend: &mut dyn RenderBackend) {
        self.submit(self.transform.matrix(), backend);
    }

    fn mesh_counts(&self) -> Option<MeshCounts> {
        Some(MeshCounts {
            vertices: self.vertices.len(),
            indices: self.indices.len(),
        })
    }
}

impl MaterialObject for Mesh {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }
}
