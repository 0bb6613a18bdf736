use glam::{Mat4, Vec3};

/// Orbit camera looking at the origin.
///
/// `yaw` turns the scene around world Y, then `pitch` tilts it around X; there
/// is no roll. Input code mutates the fields directly between frames, so the
/// matrices are always rebuilt from the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 10.0),
            pitch: 0.0,
            yaw: 0.0,
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Closest the camera may get to the origin.
    pub const MIN_DISTANCE: f32 = 0.1;

    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Self::default()
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    /// Moves along the camera's local Z (away from the origin for positive
    /// `delta`), never closer than [`Camera::MIN_DISTANCE`].
    pub fn zoom(&mut self, delta: f32) {
        let distance = self.distance();
        let dir = if distance > f32::EPSILON {
            self.position / distance
        } else {
            Vec3::Z
        };
        let next = (distance + delta).max(Self::MIN_DISTANCE);
        self.position = dir * next;
    }

    /// Adds to pitch and yaw (radians).
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
    }

    pub fn view_matrix(&self) -> Mat4 {
        // look_at degenerates when the eye sits on the up axis
        let up = if self.position.cross(Vec3::Y).length_squared() > 1e-8 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        Mat4::look_at_rh(self.position, Vec3::ZERO, up)
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
    }

    /// Perspective projection with a `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
