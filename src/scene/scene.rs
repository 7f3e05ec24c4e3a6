//! Scene registry with deferred mutation
//!
//! Objects are drawn and updated in insertion order. `add` and `remove` only
//! queue work; the live registry changes in one place, at the start of
//! [`Scene::update`], with removals applied before additions.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use super::object::{MeshCounts, ObjectHandle, ObjectId, ObjectKind};
use crate::camera::{CameraObject, FlyingCamera};
use crate::core::{EngineConfig, Event, EventBus};
use crate::renderer::RenderBackend;

/// The scene's active camera, reachable both as a registry entry and as a
/// camera.
#[derive(Clone)]
pub struct CameraHandle {
    handle: ObjectHandle,
    camera: Rc<RefCell<dyn CameraObject>>,
}

impl CameraHandle {
    /// Share `camera` between the registry and the scene's camera slot.
    pub fn new<C: CameraObject + 'static>(camera: Rc<RefCell<C>>) -> Self {
        Self {
            handle: ObjectHandle::from_shared(Rc::clone(&camera)),
            camera,
        }
    }

    /// Registry handle for this camera
    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    pub fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// # Panics
    ///
    /// Panics if the camera is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn CameraObject> {
        self.camera.borrow()
    }

    /// # Panics
    ///
    /// Panics if the camera is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn CameraObject> {
        self.camera.borrow_mut()
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CameraHandle").field(&self.handle).finish()
    }
}

/// Read-only aggregate over the live registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    /// Live objects, the camera included
    pub objects: usize,
    pub vertices: usize,
    pub indices: usize,
}

impl fmt::Display for SceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[meshes: {}; vertices: {}; indices: {}]",
            self.objects, self.vertices, self.indices
        )
    }
}

/// Graph root: a named, ordered registry of objects plus the active camera.
pub struct Scene {
    name: String,
    bus: Rc<EventBus>,
    camera: CameraHandle,
    objects: Vec<ObjectHandle>,
    pending_add: Vec<ObjectHandle>,
    pending_remove: Vec<ObjectHandle>,
}

impl Scene {
    /// Create a scene whose camera is a default [`FlyingCamera`] subscribed to
    /// `bus`. The depth range is queried from `backend`.
    pub fn new(
        name: impl Into<String>,
        bus: Rc<EventBus>,
        config: &EngineConfig,
        backend: &dyn RenderBackend,
    ) -> Self {
        let camera = FlyingCamera::create_default(
            &bus,
            &config.camera,
            config.width,
            config.height,
            backend.depth_range(),
        );
        Self::with_camera(name, bus, CameraHandle::new(camera))
    }

    /// Create a scene around an existing camera.
    pub fn with_camera(name: impl Into<String>, bus: Rc<EventBus>, camera: CameraHandle) -> Self {
        let name = name.into();
        log::info!("Creating scene '{name}'");

        let mut scene = Self {
            name,
            bus,
            camera: camera.clone(),
            objects: Vec::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
        };
        scene.install_camera(camera);
        scene
    }

    /// Queue `object` for addition and announce it right away.
    ///
    /// Subscribers see the object before it is live; it joins the registry
    /// at the next [`Scene::update`].
    pub fn add(&mut self, object: ObjectHandle) {
        self.pending_add.push(object.clone());
        self.bus.publish(&Event::ObjectAddedToScene(object));
    }

    /// Queue `object` for removal at the next [`Scene::update`].
    pub fn remove(&mut self, object: &ObjectHandle) {
        self.pending_remove.push(object.clone());
    }

    /// Make `camera` the active camera. The previous camera leaves the
    /// registry at the next update.
    pub fn replace_camera(&mut self, camera: CameraHandle) {
        let old = self.camera.handle().clone();
        log::debug!("Replacing camera {} with {}", old.id(), camera.id());
        self.pending_remove.push(old);
        self.install_camera(camera);
    }

    fn install_camera(&mut self, camera: CameraHandle) {
        self.camera = camera;
        self.camera.borrow_mut().camera_mut().refresh_view();

        let handle = self.camera.handle().clone();
        self.bus.publish(&Event::ObjectAddedToScene(handle.clone()));
        self.pending_add.push(handle);
    }

    /// Commit queued changes, then tick every live object in order.
    pub fn update(&mut self, time: f64, tick_ms: f32) {
        self.commit();

        for object in &self.objects {
            object.borrow_mut().update(time, tick_ms);
        }
    }

    fn commit(&mut self) {
        if self.pending_add.is_empty() && self.pending_remove.is_empty() {
            return;
        }

        let removed: FxHashSet<ObjectId> = self.pending_remove.drain(..).map(|o| o.id()).collect();
        self.objects.retain(|o| !removed.contains(&o.id()));

        let mut live: FxHashSet<ObjectId> = self.objects.iter().map(ObjectHandle::id).collect();
        let mut added = 0;
        for object in self.pending_add.drain(..) {
            if live.insert(object.id()) {
                self.objects.push(object);
                added += 1;
            }
        }

        log::debug!(
            "Scene '{}': removed {}, added {added}, {} live",
            self.name,
            removed.len(),
            self.objects.len()
        );
    }

    /// Draw every live object in order. The registry is left untouched.
    pub fn render(&self, time: f32, frame_ms: f32, backend: &mut dyn RenderBackend) {
        for object in &self.objects {
            object.borrow_mut().render(time, frame_ms, backend);
        }
    }

    /// Object count and geometry totals of the live registry
    pub fn stats(&self) -> SceneStats {
        let totals: MeshCounts = self
            .objects
            .iter()
            .filter_map(|o| o.borrow().mesh_counts())
            .sum();
        SceneStats {
            objects: self.objects.len(),
            vertices: totals.vertices,
            indices: totals.indices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn camera(&self) -> &CameraHandle {
        &self.camera
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Live objects in draw order
    pub fn objects(&self) -> &[ObjectHandle] {
        &self.objects
    }

    pub fn contains(&self, object: &ObjectHandle) -> bool {
        self.objects.contains(object)
    }

    /// Live objects of one variant
    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &ObjectHandle> {
        self.objects.iter().filter(move |o| o.kind() == kind)
    }

    /// Whether any add or remove is waiting for the next update
    pub fn has_pending(&self) -> bool {
        !(self.pending_add.is_empty() && self.pending_remove.is_empty())
    }

    /// Resize the active camera's viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Scene '{}' resized to {width}x{height}", self.name);
        let mut camera = self.camera.borrow_mut();
        let camera = camera.camera_mut();
        camera.resize(width, height);
        camera.refresh_view();
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("camera", &self.camera)
            .field("objects", &self.objects.len())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove.len())
            .finish()
    }
}
