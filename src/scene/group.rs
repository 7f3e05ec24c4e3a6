//! Groups of arbitrary scene objects

use super::object::{MeshCounts, ObjectHandle, ObjectKind, SceneObject};
use crate::renderer::RenderBackend;

/// Container that forwards update and render to its children, in order.
///
/// Children are owned by the group, not registered in the scene. A group
/// must not contain itself.
#[derive(Debug, Default)]
pub struct Group {
    name: String,
    children: Vec<ObjectHandle>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, child: ObjectHandle) {
        self.children.push(child);
    }

    /// Remove a child. Returns whether it was present.
    pub fn remove(&mut self, child: &ObjectHandle) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != child);
        self.children.len() != before
    }

    pub fn children(&self) -> &[ObjectHandle] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl SceneObject for Group {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Group
    }

    fn update(&mut self, time: f64, tick_ms: f32) {
        for child in &self.children {
            child.borrow_mut().update(time, tick_ms);
        }
    }

    fn render(&mut self, time: f32, frame_ms: f32, backend: &mut dyn RenderBackend) {
        for child in &self.children {
            child.borrow_mut().render(time, frame_ms, backend);
        }
    }

    fn mesh_counts(&self) -> Option<MeshCounts> {
        let counts: Vec<MeshCounts> = self
            .children
            .iter()
            .filter_map(|c| c.borrow().mesh_counts())
            .collect();
        if counts.is_empty() {
            None
        } else {
            Some(counts.into_iter().sum())
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::renderer::{DepthRange, RecordingBackend};
    use crate::scene::Mesh;

    #[test]
    fn test_group_fans_out_and_counts() {
        let mut group = Group::new("axes");
        group.push(ObjectHandle::new(
            Mesh::line(Vec3::ZERO, Vec3::X, [1.0, 0.0, 0.0, 1.0]).with_name("x"),
        ));
        group.push(ObjectHandle::new(
            Mesh::line(Vec3::ZERO, Vec3::Y, [0.0, 1.0, 0.0, 1.0]).with_name("y"),
        ));

        let mut backend = RecordingBackend::new(DepthRange::ZeroToOne);
        group.render(0.0, 16.0, &mut backend);

        assert_eq!(backend.labels(), vec!["x", "y"]);
        assert_eq!(
            group.mesh_counts(),
            Some(MeshCounts {
                vertices: 4,
                indices: 4
            })
        );
    }

    #[test]
    fn test_empty_group_has_no_geometry() {
        let group = Group::new("empty");
        assert_eq!(group.mesh_counts(), None);
    }

    #[test]
    fn test_remove_child() {
        let mut group = Group::new("g");
        let child = ObjectHandle::new(Mesh::cube());
        group.push(child.clone());
        assert!(group.remove(&child));
        assert!(!group.remove(&child));
        assert!(group.is_empty());
    }
}
