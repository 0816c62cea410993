//! Camera operations - Pure DOP functions
//!
//! All functions are pure: they take data, return new data, no side effects.

use super::camera_data::CameraData;
use crate::world::core::{ChunkGeometry, ChunkPos, SphericalRotation, WorldPos};
use crate::world::management::World;
use crate::world::picking::{self, LookingAt};
use cgmath::{InnerSpace, Point3, Vector3};

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn init_camera(pos: Point3<f32>, rot: SphericalRotation) -> CameraData {
    CameraData { pos, rot }
}

/// Camera at spawn, looking at the horizon
pub fn init_camera_with_spawn(spawn: Point3<f32>) -> CameraData {
    CameraData {
        pos: spawn,
        ..Default::default()
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

/// Horizontal component of the gaze, normalized. Zero when looking
/// straight up or down.
pub fn calculate_forward_vector(rot: SphericalRotation) -> Vector3<f32> {
    let gaze = rot.gaze();
    let flat = Vector3::new(gaze.x, 0.0, gaze.z);
    if flat.magnitude2() <= f32::EPSILON {
        return Vector3::new(0.0, 0.0, 0.0);
    }
    flat.normalize()
}

pub fn calculate_right_vector(rot: SphericalRotation) -> Vector3<f32> {
    let forward = calculate_forward_vector(rot);
    Vector3::new(-forward.z, 0.0, forward.x)
}

/// Move along the horizontal gaze direction
pub fn move_forward(camera: &CameraData, distance: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.pos += calculate_forward_vector(camera.rot) * distance;
    new_camera
}

pub fn move_right(camera: &CameraData, distance: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.pos += calculate_right_vector(camera.rot) * distance;
    new_camera
}

pub fn move_up(camera: &CameraData, distance: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.pos.y += distance;
    new_camera
}

/// Rotate by angle deltas (radians). Theta wraps, phi clamps to `[0, PI]`.
pub fn rotate(camera: &CameraData, d_theta: f32, d_phi: f32) -> CameraData {
    CameraData {
        pos: camera.pos,
        rot: camera.rot.rotated(d_theta, d_phi),
    }
}

// ============================================================================
// PICKING
// ============================================================================

/// Ray vector handed to the block picker for this camera
pub fn camera_ray_vector(camera: &CameraData) -> Vector3<f32> {
    camera.rot.camera_ray_vector()
}

/// Block the camera is looking at within `max_reach`
pub fn looking_at(camera: &CameraData, world: &World, max_reach: f32) -> Option<LookingAt> {
    picking::looking_at_rotation(world, camera.pos, camera.rot, max_reach)
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

pub fn camera_block_position(camera: &CameraData) -> WorldPos {
    WorldPos::containing(camera.pos)
}

/// Chunk the camera stands in
pub fn camera_chunk_position(camera: &CameraData, geometry: ChunkGeometry) -> ChunkPos {
    geometry.world_to_chunk(camera_block_position(camera))
}

/// Square of chunks within `distance` of the camera's chunk, nearest ring first
pub fn chunks_in_load_distance(camera: &CameraData, geometry: ChunkGeometry, distance: i32) -> Vec<ChunkPos> {
    let center = camera_chunk_position(camera, geometry);
    let radius = distance.max(0);

    let mut chunks = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for x in -radius..=radius {
        for z in -radius..=radius {
            chunks.push(ChunkPos::new(center.x + x, center.z + z));
        }
    }
    chunks.sort_by_key(|c| (c.x - center.x).abs().max((c.z - center.z).abs()));
    chunks
}

/// Log camera context for debugging
pub fn log_camera_context(camera: &CameraData, geometry: ChunkGeometry) {
    let chunk_pos = camera_chunk_position(camera, geometry);

    log::debug!(
        "[Camera] Position: ({:.1}, {:.1}, {:.1}) | Chunk: {}",
        camera.pos.x,
        camera.pos.y,
        camera.pos.z,
        chunk_pos
    );

    log::debug!(
        "[Camera] Theta: {:.3}rad ({:.1}°) | Phi: {:.3}rad ({:.1}°)",
        camera.rot.theta,
        camera.rot.theta.to_degrees(),
        camera.rot.phi,
        camera.rot.phi.to_degrees()
    );
}
