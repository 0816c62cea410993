//! Physical body data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in body_operations.rs

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An axis-aligned box moving through the world. Players and projectiles
/// share this data and differ only in what the caller does with hits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyData {
    /// Box min corner in world space
    pub position: Point3<f32>,

    /// Box size
    pub dimension: Vector3<f32>,

    /// Displacement per 16 ms of simulated time
    pub velocity: Vector3<f32>,

    /// Resting on a block at the end of the last tick
    pub on_ground: bool,

    /// Pulled down by gravity each tick
    pub gravitable: bool,

    /// Takes part in body-vs-body push-out and blocks placement
    pub tangible: bool,

    /// Pushed out of solid blocks
    pub world_collision: bool,
}
