//! Spinning demo camera looking down at the fountain

use ember_core::matrix::{self, Mat4};
use ember_core::Vec3;

/// A camera pulled back from the origin, tilted down and slowly spinning
/// about the vertical axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Distance from the origin along the view axis
    pub distance: f32,
    /// Downward tilt in degrees (rotation about X)
    pub pitch: f32,
    /// Current spin in degrees (rotation about Y)
    pub yaw: f32,
    /// Spin speed in degrees per second
    pub spin_rate: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            distance: 25.0,
            pitch: 45.0,
            yaw: 0.0,
            spin_rate: 25.0,
            fov: 45.0,
            near: 0.1,
            far: 200.0,
            aspect: 1024.0 / 768.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spin by `spin_rate * dt`, wrapping yaw into [0, 360)
    pub fn advance(&mut self, dt: f32) {
        self.yaw = (self.yaw + self.spin_rate * dt).rem_euclid(360.0);
    }

    /// World to view: translate(0, 0, -distance) * rotate_x(pitch) * rotate_y(yaw)
    pub fn view_matrix(&self) -> Mat4 {
        let spin = matrix::rotation_y(self.yaw.to_radians());
        let tilt = matrix::rotation_x(self.pitch.to_radians());
        let pull_back = matrix::translation(Vec3::new(0.0, 0.0, -self.distance));
        matrix::mat4_mul(&pull_back, &matrix::mat4_mul(&tilt, &spin))
    }

    /// Get the projection matrix (4x4, column-major)
    pub fn projection_matrix(&self) -> Mat4 {
        matrix::perspective(self.fov, self.aspect, self.near, self.far)
    }
}
