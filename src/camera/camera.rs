//! Base camera: orientation, projection and view matrices

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::renderer::{DepthRange, RenderBackend};
use crate::scene::{MaterialObject, ObjectKind, SceneObject, Transform};

/// Pitch limit in degrees, either side of the horizon.
pub const MAX_PITCH_DEGREES: f32 = 85.0;

/// View slot the camera drives.
pub const CAMERA_VIEW_ID: u16 = 0;

/// Perspective parameters, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_degrees: f32,
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
}

/// Left-handed perspective camera.
///
/// Orientation is kept as a forward `direction` and a `right` vector, both
/// re-derived from their current values on every rotation. Yaw always turns
/// about world up and pitch is clamped to ±85°, so the camera can neither
/// roll nor flip over the poles.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    direction: Vec3,
    right: Vec3,
    up: Vec3,
    perspective: Perspective,
    depth_range: DepthRange,
    view: Mat4,
    projection: Mat4,
    /// Log position and rotation on every view refresh
    pub debug_mode: bool,
}

impl Camera {
    /// Create a camera at the origin looking down -Z.
    pub fn new(perspective: Perspective, depth_range: DepthRange) -> Self {
        let mut camera = Self {
            transform: Transform::default(),
            direction: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            perspective,
            depth_range,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            debug_mode: false,
        };
        camera.rebuild_projection();
        camera.refresh_view();
        camera
    }

    /// Set the projection. The depth range is queried from `backend`.
    pub fn set_perspective(
        &mut self,
        fov_degrees: f32,
        width: u32,
        height: u32,
        near: f32,
        far: f32,
        backend: &dyn RenderBackend,
    ) {
        self.perspective = Perspective {
            fov_degrees,
            width,
            height,
            near,
            far,
        };
        self.depth_range = backend.depth_range();
        self.rebuild_projection();
        self.refresh_view();
    }

    /// Keep the field of view and clip planes, change the viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.perspective.width = width;
        self.perspective.height = height;
        self.rebuild_projection();
    }

    fn rebuild_projection(&mut self) {
        let p = self.perspective;
        let aspect = p.width as f32 / p.height.max(1) as f32;
        self.projection = perspective_lh(
            p.fov_degrees.to_radians(),
            aspect,
            p.near,
            p.far,
            self.depth_range,
        );
    }

    /// Rebuild the view matrix from the current position and direction.
    pub fn refresh_view(&mut self) {
        self.direction = self.direction.normalize();
        self.right = self.right.normalize();

        let eye = self.transform.position;
        self.view = Mat4::look_at_lh(eye, eye + self.direction, Vec3::Y);

        if self.debug_mode {
            log::info!("Current pos: {}", self.transform.position);
            log::info!("Current rotation: {}", self.transform.rotation);
        }
    }

    /// Turn about world up by `delta` degrees.
    pub fn rotate_left_right(&mut self, delta: f32) {
        let rotation = Quat::from_axis_angle(Vec3::Y, delta.to_radians());
        self.direction = (rotation * self.direction.normalize()).normalize();
        self.right = (rotation * self.right.normalize()).normalize();
    }

    /// Tilt about the camera's right axis by `delta` degrees. Returns `false`
    /// and leaves the direction untouched if the result would leave the
    /// ±85° band.
    pub fn rotate_up_down(&mut self, delta: f32) -> bool {
        let direction = self.direction.normalize();
        let new_pitch = self.pitch_degrees() + delta;
        if !(-MAX_PITCH_DEGREES..=MAX_PITCH_DEGREES).contains(&new_pitch) {
            return false;
        }

        let axis = direction.cross(self.up).normalize();
        let rotation = Quat::from_axis_angle(axis, delta.to_radians());
        self.direction = (rotation * direction).normalize();
        true
    }

    /// Signed angle between the direction and the horizontal plane.
    pub fn pitch_degrees(&self) -> f32 {
        let direction = self.direction.normalize();
        let flattened = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        if flattened == Vec3::ZERO {
            return 90.0_f32.copysign(direction.y);
        }

        let angle = flattened.dot(direction).clamp(-1.0, 1.0).acos().to_degrees();
        if direction.y < 0.0 { -angle } else { angle }
    }

    pub fn move_forward(&mut self, offset: f32) {
        self.transform.position += self.direction * offset;
        self.refresh_view();
    }

    pub fn move_right(&mut self, offset: f32) {
        self.transform.position += self.right * offset;
        self.refresh_view();
    }

    pub fn move_up(&mut self, offset: f32) {
        self.transform.position += self.up * offset;
        self.refresh_view();
    }

    /// Accumulate rotation angles already applied to the direction.
    pub(crate) fn record_rotation(&mut self, yaw: f32, pitch: f32) {
        self.transform.rotation += Vec3::new(yaw, pitch, 0.0);
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Push view and projection to the backend.
    pub fn apply(&self, backend: &mut dyn RenderBackend) {
        backend.set_view_transform(CAMERA_VIEW_ID, &self.view, &self.projection);
    }
}

impl SceneObject for Camera {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Camera
    }

    fn render(&mut self, _time: f32, _frame_ms: f32, backend: &mut dyn RenderBackend) {
        self.apply(backend);
    }
}

impl MaterialObject for Camera {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.refresh_view();
    }

    /// Treat `rotation` as a delta: `x` turns left/right, `y` tilts up/down.
    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotate_left_right(rotation.x);
        self.record_rotation(rotation.x, 0.0);
        if self.rotate_up_down(rotation.y) {
            self.record_rotation(0.0, rotation.y);
        }
        self.refresh_view();
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }
}

/// A scene object that can act as a scene's active camera.
pub trait CameraObject: MaterialObject {
    fn camera(&self) -> &Camera;

    fn camera_mut(&mut self) -> &mut Camera;
}

impl CameraObject for Camera {
    fn camera(&self) -> &Camera {
        self
    }

    fn camera_mut(&mut self) -> &mut Camera {
        self
    }
}

/// Left-handed perspective projection targeting `depth`.
pub fn perspective_lh(fov_y: f32, aspect: f32, near: f32, far: f32, depth: DepthRange) -> Mat4 {
    match depth {
        DepthRange::ZeroToOne => Mat4::perspective_lh(fov_y, aspect, near, far),
        DepthRange::NegativeOneToOne => {
            let h = 1.0 / (0.5 * fov_y).tan();
            let w = h / aspect;
            let range = far - near;
            Mat4::from_cols(
                Vec4::new(w, 0.0, 0.0, 0.0),
                Vec4::new(0.0, h, 0.0, 0.0),
                Vec4::new(0.0, 0.0, (far + near) / range, 1.0),
                Vec4::new(0.0, 0.0, -2.0 * far * near / range, 0.0),
            )
        }
    }
}
