//! Backends that do not touch a GPU

use glam::Mat4;

use super::backend::{DepthRange, DrawCall, RenderBackend, Topology};

/// Discards draws, keeping only counters.
#[derive(Debug, Clone)]
pub struct NullBackend {
    depth_range: DepthRange,
    frames: u64,
    draws_this_frame: u32,
    draws_last_frame: u32,
}

impl NullBackend {
    pub fn new(depth_range: DepthRange) -> Self {
        Self {
            depth_range,
            frames: 0,
            draws_this_frame: 0,
            draws_last_frame: 0,
        }
    }

    /// Frames flushed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draws submitted in the last completed frame
    pub fn draws_last_frame(&self) -> u32 {
        self.draws_last_frame
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new(DepthRange::ZeroToOne)
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    fn set_view_transform(&mut self, _view_id: u16, _view: &Mat4, _projection: &Mat4) {}

    fn submit(&mut self, _draw: &DrawCall<'_>) {
        self.draws_this_frame += 1;
    }

    fn frame(&mut self) {
        log::trace!("Frame {} flushed {} draws", self.frames, self.draws_this_frame);
        self.frames += 1;
        self.draws_last_frame = std::mem::take(&mut self.draws_this_frame);
    }

    fn shutdown(&mut self) {
        log::info!("Null backend shut down after {} frames", self.frames);
    }
}

/// Owned copy of a submitted draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub label: String,
    pub view_id: u16,
    pub transform: Mat4,
    pub vertex_count: u32,
    pub index_count: usize,
    pub topology: Topology,
    pub color: Option<[f32; 4]>,
}

/// Records everything it is asked to do.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    depth_range: DepthRange,
    /// Draws in submission order, across all frames
    pub draws: Vec<DrawRecord>,
    /// `(view_id, view, projection)` in call order
    pub view_transforms: Vec<(u16, Mat4, Mat4)>,
    pub frames: u32,
    pub shut_down: bool,
}

impl RecordingBackend {
    pub fn new(depth_range: DepthRange) -> Self {
        Self {
            depth_range,
            draws: Vec::new(),
            view_transforms: Vec::new(),
            frames: 0,
            shut_down: false,
        }
    }

    /// Labels of all recorded draws, in order
    pub fn labels(&self) -> Vec<&str> {
        self.draws.iter().map(|d| d.label.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
        self.view_transforms.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    fn set_view_transform(&mut self, view_id: u16, view: &Mat4, projection: &Mat4) {
        self.view_transforms.push((view_id, *view, *projection));
    }

    fn submit(&mut self, draw: &DrawCall<'_>) {
        self.draws.push(DrawRecord {
            label: draw.label.to_owned(),
            view_id: draw.view_id,
            transform: draw.transform,
            vertex_count: draw.vertex_count,
            index_count: draw.indices.len(),
            topology: draw.topology,
            color: draw.color,
        });
    }

    fn frame(&mut self) {
        self.frames += 1;
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}
