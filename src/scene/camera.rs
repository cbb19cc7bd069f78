//! Camera
//!
//! The renderer's view of a camera is matrices, position and yaw; motion
//! integration and input sampling are owned by the hosting shell, which
//! mutates this state between frames. The world is Z-up.

use glam::{Mat4, Vec3};

/// Camera state read by the renderer each frame.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation around the Z axis, radians.
    pub yaw: f32,
    /// Rotation toward the Z axis, radians.
    pub pitch: f32,
    /// True while the pointer hovers the render surface; input sampling
    /// uses this to gate mouse look.
    pub mouse_over_surface: bool,
    name: Option<String>,
    viewport_width: f32,
    viewport_height: f32,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// A camera at the origin looking down +X.
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            mouse_over_surface: false,
            name: None,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 1.0,
            far: 40000.0,
        }
    }

    /// The default camera: placed outside the given bounds, looking at their
    /// center. Zero-extent bounds fall back to a unit offset.
    pub fn from_bounds(
        viewport_width: f32,
        viewport_height: f32,
        min_bounds: Vec3,
        max_bounds: Vec3,
    ) -> Self {
        let center = (min_bounds + max_bounds) / 2.0;
        let extent = max_bounds - min_bounds;
        let position = if extent.length_squared() > 0.0 {
            max_bounds + extent * 0.5
        } else {
            Vec3::ONE
        };

        let mut camera = Self::new(viewport_width, viewport_height);
        camera.position = position;
        camera.look_at(center);
        camera
    }

    /// A registered camera placed from a scene transform. Position comes
    /// from the translation, orientation from the transform's forward (+X)
    /// axis.
    pub fn from_transform(
        viewport_width: f32,
        viewport_height: f32,
        transform: Mat4,
        name: impl Into<String>,
    ) -> Self {
        let mut camera = Self::new(viewport_width, viewport_height);
        camera.position = transform.w_axis.truncate();
        let forward = transform.x_axis.truncate();
        if forward.length_squared() > 0.0 {
            camera.look_at(camera.position + forward);
        }
        camera.name = Some(name.into());
        camera
    }

    /// Name of a registered camera; the default camera has none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Point the camera at a world position.
    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.position).normalize_or_zero();
        self.yaw = direction.y.atan2(direction.x);
        self.pitch = direction.z.clamp(-1.0, 1.0).asin();
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
        )
    }

    /// Unit vector to the camera's left, in the ground plane. Drives the
    /// animated light sweep.
    pub fn left(&self) -> Vec3 {
        Vec3::new(
            (self.yaw + std::f32::consts::FRAC_PI_2).cos(),
            (self.yaw + std::f32::consts::FRAC_PI_2).sin(),
            0.0,
        )
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y,
            self.viewport_width / self.viewport_height,
            self.near,
            self.far,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Z)
    }
}
