//! Render backend seam
//!
//! Scene objects never talk to a graphics API directly. They describe what
//! they want drawn as [`DrawCall`]s and hand them to whatever backend the
//! engine was built with.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Clip-space depth range of the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthRange {
    /// Direct3D, Metal and Vulkan style `[0, 1]`
    ZeroToOne,
    /// OpenGL style homogeneous `[-1, 1]`
    NegativeOneToOne,
}

/// Primitive topology of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    Triangles,
    #[default]
    TriangleStrip,
    Lines,
    LineStrip,
    Points,
}

/// Vertex/fragment program pair, by shader identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderPair {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderPair {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// One draw request.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Debug label of the submitting object
    pub label: &'a str,
    /// View the draw belongs to
    pub view_id: u16,
    /// Model matrix
    pub transform: Mat4,
    /// Vertex data as raw bytes
    pub vertex_data: &'a [u8],
    pub vertex_count: u32,
    pub indices: &'a [u32],
    pub topology: Topology,
    /// Program to draw with, `None` for the backend default
    pub shaders: Option<&'a ShaderPair>,
    pub texture: Option<&'a str>,
    pub color: Option<[f32; 4]>,
}

/// A graphics backend the engine draws through.
pub trait RenderBackend {
    /// Human readable backend name
    fn name(&self) -> &str;

    /// Depth range the projection matrix must target.
    fn depth_range(&self) -> DepthRange;

    /// Set the view and projection used by `view_id` for the next frame.
    fn set_view_transform(&mut self, view_id: u16, view: &Mat4, projection: &Mat4);

    /// Queue a draw for the current frame.
    fn submit(&mut self, draw: &DrawCall<'_>);

    /// Flush the frame. Called once per loop iteration after the scene has
    /// rendered.
    fn frame(&mut self) {}

    /// Release backend resources. Called once when the loop exits.
    fn shutdown(&mut self) {}
}
