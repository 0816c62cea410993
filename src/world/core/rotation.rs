use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Camera orientation in spherical angles.
///
/// `theta` is the azimuth in the xz plane, `phi` the polar angle measured
/// from +y, so `phi = 0` looks straight up and `phi = PI` straight down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SphericalRotation {
    pub theta: f32,
    pub phi: f32,
}

impl SphericalRotation {
    pub const fn new(theta: f32, phi: f32) -> Self {
        Self { theta, phi }
    }

    /// Standard spherical to Cartesian conversion on the unit sphere
    pub fn to_cartesian(self) -> Vector3<f32> {
        Vector3::new(
            self.phi.sin() * self.theta.cos(),
            self.phi.cos(),
            self.phi.sin() * self.theta.sin(),
        )
    }

    /// Vector consumed by the block picker.
    ///
    /// The y component is flipped relative to `to_cartesian`; the result
    /// points from the target back toward the eye, which is why picker hits
    /// have a non-positive ray parameter.
    pub fn camera_ray_vector(self) -> Vector3<f32> {
        let v = self.to_cartesian();
        Vector3::new(v.x, -v.y, v.z)
    }

    /// Direction the camera actually looks toward
    pub fn gaze(self) -> Vector3<f32> {
        -self.camera_ray_vector()
    }

    /// Apply deltas, wrapping theta into `[0, 2PI)` and clamping phi to `[0, PI]`
    pub fn rotated(self, d_theta: f32, d_phi: f32) -> Self {
        Self {
            theta: (self.theta + d_theta).rem_euclid(2.0 * PI),
            phi: (self.phi + d_phi).clamp(0.0, PI),
        }
    }
}
