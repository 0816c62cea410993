//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::world::core::SphericalRotation;

/// Camera data structure - pure data, no methods
///
/// Serialized as `{ pos: {x, y, z}, rot: {theta, phi} }`, the shape pick
/// queries arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    /// Eye position in world space (block units)
    pub pos: Point3<f32>,

    /// Spherical view angles
    pub rot: SphericalRotation,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            pos: Point3::new(0.0, 0.0, 0.0),
            rot: SphericalRotation::new(0.0, std::f32::consts::FRAC_PI_2),
        }
    }
}
