//! Scene object capabilities and handles
//!
//! Every participant in a scene implements [`SceneObject`]. Objects live
//! behind shared, interior-mutable handles so the registry, event payloads
//! and application code can all refer to the same instance.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use glam::Vec3;

use super::transform::Transform;
use crate::renderer::RenderBackend;

/// Identity of a scene object: the address of its shared allocation.
///
/// Unique among live objects. A handle keeps its allocation alive, so ids
/// taken from handles cannot collide while those handles exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    fn of<T: ?Sized>(object: &Rc<RefCell<T>>) -> Self {
        Self(Rc::as_ptr(object).cast::<()>() as usize)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// The closed set of object variants a scene holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Camera,
    Mesh,
    Model,
    Group,
}

/// Vertex and index totals of a mesh-bearing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshCounts {
    pub vertices: usize,
    pub indices: usize,
}

impl std::ops::Add for MeshCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            vertices: self.vertices + rhs.vertices,
            indices: self.indices + rhs.indices,
        }
    }
}

impl std::iter::Sum for MeshCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}

/// Something that can be placed in a scene.
///
/// `update` runs once per fixed tick, `render` once per rendered frame. Both
/// default to doing nothing.
pub trait SceneObject: fmt::Debug {
    /// Which variant this object is
    fn kind(&self) -> ObjectKind;

    /// Advance simulation state by one tick of `tick_ms` milliseconds.
    fn update(&mut self, _time: f64, _tick_ms: f32) {}

    /// Submit draw work for this frame.
    fn render(&mut self, _time: f32, _frame_ms: f32, _backend: &mut dyn RenderBackend) {}

    /// Vertex/index totals for objects that carry geometry.
    fn mesh_counts(&self) -> Option<MeshCounts> {
        None
    }
}

/// A scene object with a spatial transform.
///
/// The setters are the only way to change the transform, so implementors that
/// cache derived state can refresh it there.
pub trait MaterialObject: SceneObject {
    fn transform(&self) -> &Transform;

    fn set_position(&mut self, position: Vec3);

    fn set_rotation(&mut self, rotation: Vec3);

    fn set_scale(&mut self, scale: Vec3);

    fn position(&self) -> Vec3 {
        self.transform().position
    }
}

// ============================================================================
// Object Handle
// ============================================================================

/// Shared reference to an object in (or destined for) a scene.
///
/// Handles compare and hash by [`ObjectId`], which follows the allocation:
/// every handle wrapping the same `Rc` is equal, however it was created.
#[derive(Clone)]
pub struct ObjectHandle {
    id: ObjectId,
    object: Rc<RefCell<dyn SceneObject>>,
}

impl ObjectHandle {
    /// Wrap a new object
    pub fn new<T: SceneObject + 'static>(object: T) -> Self {
        Self::from_shared(Rc::new(RefCell::new(object)))
    }

    /// Wrap an object the caller keeps a typed reference to
    pub fn from_shared<T: SceneObject + 'static>(object: Rc<RefCell<T>>) -> Self {
        Self {
            id: ObjectId::of(&object),
            object,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Variant of the wrapped object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn kind(&self) -> ObjectKind {
        self.object.borrow().kind()
    }

    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn SceneObject> {
        self.object.borrow()
    }

    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn SceneObject> {
        self.object.borrow_mut()
    }

    /// Check whether two handles share the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectHandle {}

impl Hash for ObjectHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ObjectHandle");
        s.field("id", &self.id);
        match self.object.try_borrow() {
            Ok(object) => s.field("kind", &object.kind()),
            Err(_) => s.field("kind", &"<borrowed>"),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Marker;

    impl SceneObject for Marker {
        fn kind(&self) -> ObjectKind {
            ObjectKind::Group
        }
    }

    #[test]
    fn test_handles_have_unique_ids() {
        let a = ObjectHandle::new(Marker);
        let b = ObjectHandle::new(Marker);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_is_same_object() {
        let a = ObjectHandle::new(Marker);
        let b = a.clone();
        assert_eq!(a, b);
        assert!(a.ptr_eq(&b));
        assert_eq!(b.kind(), ObjectKind::Group);
    }

    #[test]
    fn test_handles_from_same_shared_object_are_equal() {
        let shared = Rc::new(RefCell::new(Marker));
        let a = ObjectHandle::from_shared(Rc::clone(&shared));
        let b = ObjectHandle::from_shared(shared);
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_debug_while_borrowed() {
        let handle = ObjectHandle::new(Marker);
        let _guard = handle.borrow_mut();
        assert!(format!("{handle:?}").contains("<borrowed>"));
    }

    #[test]
    fn test_mesh_counts_sum() {
        let total: MeshCounts = [
            MeshCounts {
                vertices: 3,
                indices: 3,
            },
            MeshCounts {
                vertices: 4,
                indices: 6,
            },
        ]
        .into_iter()
        .sum();
        assert_eq!(
            total,
            MeshCounts {
                vertices: 7,
                indices: 9
            }
        );
    }
}
