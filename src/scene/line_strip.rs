//! Line strips: a growing polyline built on a model
//!
//! Each pair of consecutive points becomes one segment mesh. The strip keeps
//! at most [`MAX_STRIP_POINTS`] points; adding past the cap drops the oldest
//! point together with its segment, so the strip trails behind its newest
//! point.

use std::collections::VecDeque;

use glam::Vec3;

use super::mesh::{Mesh, MeshInfo, Vertex};
use super::model::Model;
use super::object::{MaterialObject, MeshCounts, ObjectKind, SceneObject};
use super::transform::Transform;
use crate::renderer::{RenderBackend, Topology};

/// Most points a strip holds at once
pub const MAX_STRIP_POINTS: usize = 100;

/// A flat-colored polyline in the model's local space.
#[derive(Debug, Clone)]
pub struct LineStrip {
    model: Model,
    points: VecDeque<Vec3>,
    color: [f32; 4],
    width: f32,
}

impl LineStrip {
    /// Build a strip through `points`, keeping the last [`MAX_STRIP_POINTS`].
    pub fn new(points: impl IntoIterator<Item = Vec3>, color: [f32; 4], width: f32) -> Self {
        let mut strip = Self {
            model: Model::new("line_strip", Vec::new()),
            points: VecDeque::new(),
            color,
            width,
        };
        for point in points {
            strip.add_point(point);
        }
        strip
    }

    /// Extend the strip to `point`.
    pub fn add_point(&mut self, point: Vec3) {
        if let Some(&last) = self.points.back() {
            self.model.push(self.segment(last, point));
        }
        self.points.push_back(point);

        if self.points.len() > MAX_STRIP_POINTS {
            self.points.pop_front();
            self.model.remove(0);
        }
    }

    fn segment(&self, start: Vec3, end: Vec3) -> Mesh {
        let vertices = vec![Vertex::at(start.into()), Vertex::at(end.into())];
        let info = MeshInfo::flat_color(self.color).with_topology(Topology::LineStrip);
        Mesh::new("line_strip", vertices, vec![0, 1], info)
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }

    pub fn segment_count(&self) -> usize {
        self.model.meshes().len()
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Requested line width in pixels. Backends that cannot draw wide
    /// lines ignore it.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl SceneObject for LineStrip {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Model
    }

    fn update(&mut self, time: f64, tick_ms: f32) {
        self.model.update(time, tick_ms);
    }

    fn render(&mut self, time: f32, frame_ms: f32, backend: &mut dyn RenderBackend) {
        self.model.render(time, frame_ms, backend);
    }

    fn mesh_counts(&self) -> Option<MeshCounts> {
        self.model.mesh_counts()
    }
}

impl MaterialObject for LineStrip {
    fn transform(&self) -> &Transform {
        self.model.transform()
    }

    fn set_position(&mut self, position: Vec3) {
        self.model.set_position(position);
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.model.set_rotation(rotation);
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.model.set_scale(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DepthRange, RecordingBackend};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    fn ramp(count: usize) -> impl Iterator<Item = Vec3> {
        (0..count).map(|i| Vec3::new(i as f32, 0.0, 0.0))
    }

    #[test]
    fn test_one_segment_per_consecutive_pair() {
        let strip = LineStrip::new(ramp(4), RED, 2.0);
        assert_eq!(strip.points().len(), 4);
        assert_eq!(strip.segment_count(), 3);
        assert_eq!(
            strip.mesh_counts(),
            Some(MeshCounts {
                vertices: 6,
                indices: 6
            })
        );
    }

    #[test]
    fn test_single_point_has_no_segments() {
        let mut strip = LineStrip::new([Vec3::ZERO], RED, 1.0);
        assert_eq!(strip.segment_count(), 0);

        strip.add_point(Vec3::Y);
        assert_eq!(strip.segment_count(), 1);
        let segment = &strip.model().meshes()[0];
        assert_eq!(segment.vertices()[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(segment.vertices()[1].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_oldest_point_dropped_past_cap() {
        let mut strip = LineStrip::new(ramp(MAX_STRIP_POINTS), RED, 1.0);
        assert_eq!(strip.segment_count(), MAX_STRIP_POINTS - 1);

        strip.add_point(Vec3::new(MAX_STRIP_POINTS as f32, 0.0, 0.0));

        assert_eq!(strip.points().len(), MAX_STRIP_POINTS);
        assert_eq!(strip.segment_count(), MAX_STRIP_POINTS - 1);
        assert_eq!(strip.points().next(), Some(Vec3::X));
        let first = &strip.model().meshes()[0];
        assert_eq!(first.vertices()[0].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_draws_flat_colored_strips() {
        let mut strip = LineStrip::new(ramp(3), RED, 1.0);
        strip.set_position(Vec3::new(0.0, 2.0, 0.0));
        let mut backend = RecordingBackend::new(DepthRange::ZeroToOne);

        strip.render(0.0, 16.0, &mut backend);

        assert_eq!(backend.draws.len(), 2);
        for draw in &backend.draws {
            assert_eq!(draw.topology, Topology::LineStrip);
            assert_eq!(draw.color, Some(RED));
            assert_eq!(draw.transform.w_axis.y, 2.0);
        }
    }
}
