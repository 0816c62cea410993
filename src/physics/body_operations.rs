//! Body operations - Pure DOP functions
//!
//! Integration of velocities and resolution of bodies against solid blocks
//! and against each other. Pushes are applied one at a time in neighbour
//! order rather than solved simultaneously.

use cgmath::{InnerSpace, Point3, Vector3};
use rustc_hash::FxHashSet;

use super::aabb::{self, FaceHit, AABB};
use super::body_data::BodyData;
use crate::world::core::{WorldPos, HALO_OFFSETS};
use crate::world::management::World;
use crate::PhysicsConfig;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Tangible, gravitable body at rest
pub fn create_body(position: Point3<f32>, dimension: Vector3<f32>) -> BodyData {
    BodyData {
        position,
        dimension,
        velocity: Vector3::new(0.0, 0.0, 0.0),
        on_ground: false,
        gravitable: true,
        tangible: true,
        world_collision: true,
    }
}

pub fn body_aabb(body: &BodyData) -> AABB {
    aabb::aabb_from_position_dimension(body.position, body.dimension)
}

// ============================================================================
// INTEGRATION
// ============================================================================

/// Add one tick of gravity unless grounded or already at terminal speed
pub fn apply_gravity(body: &mut BodyData, physics: &PhysicsConfig) {
    if !body.gravitable || body.on_ground {
        return;
    }
    if body.velocity.magnitude() > physics.terminal_speed {
        return;
    }
    body.velocity.y += physics.gravity;
}

/// Move by velocity scaled to the tick length; a zero scale freezes the body
pub fn integrate(body: &mut BodyData, scale: f32) {
    body.position += body.velocity * scale;
}

pub fn add_velocity(body: &mut BodyData, force: Vector3<f32>) {
    body.velocity += force;
}

/// React to a push-out: stop along the hit axis, land on ground hits
pub fn apply_hit(body: &mut BodyData, hit: FaceHit) {
    body.velocity[hit.axis.index()] = 0.0;
    if hit.is_ground() {
        body.on_ground = true;
    }
}

/// Push `body` out of `blocker` and report the face that was hit
pub fn push_body_out(body: &mut BodyData, blocker: &AABB) -> FaceHit {
    let mut mover = body_aabb(body);
    let hit = aabb::aabb_push_out(&mut mover, blocker);
    body.position = mover.min;
    apply_hit(body, hit);
    hit
}

// ============================================================================
// COLLISION RESOLUTION
// ============================================================================

/// Cells in the 1-block halo around every cell the body covers, first-seen
/// order, each listed once
pub fn halo_cells(body: &BodyData) -> Vec<WorldPos> {
    let mut seen = FxHashSet::default();
    let mut cells = Vec::new();

    let steps = |extent: f32| extent.ceil().max(0.0) as i32;
    for x in 0..steps(body.dimension.x) {
        for y in 0..steps(body.dimension.y) {
            for z in 0..steps(body.dimension.z) {
                let center = body.position + Vector3::new(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5);
                for [dx, dy, dz] in HALO_OFFSETS {
                    let cell = WorldPos::containing(center + Vector3::new(dx as f32, dy as f32, dz as f32));
                    if seen.insert(cell) {
                        cells.push(cell);
                    }
                }
            }
        }
    }

    cells
}

/// Push the body out of every solid block overlapping it. Missing chunks
/// and intangible blocks are ignored.
pub fn resolve_world_collisions(body: &mut BodyData, world: &World) -> Vec<(WorldPos, FaceHit)> {
    let mut hits = Vec::new();
    if !body.world_collision {
        return hits;
    }

    for cell in halo_cells(body) {
        let Some(block) = world.get_block(cell) else {
            continue;
        };
        if block.block_type.is_intangible() {
            continue;
        }
        let blocker = aabb::aabb_for_block(cell);
        if !aabb::aabb_penetrates(&body_aabb(body), &blocker) {
            continue;
        }
        let hit = push_body_out(body, &blocker);
        log::trace!(
            "[body_operations::resolve_world_collisions] Pushed out of {} {} along {:?}",
            block.block_type,
            cell,
            hit.axis
        );
        hits.push((cell, hit));
    }

    hits
}

/// Separate overlapping tangible bodies: for every ordered pair the first
/// body is pushed out of the second
pub fn resolve_body_collisions(bodies: &mut [BodyData]) -> usize {
    let mut pushes = 0;
    for i in 0..bodies.len() {
        if !bodies[i].tangible {
            continue;
        }
        for j in 0..bodies.len() {
            if i == j || !bodies[j].tangible {
                continue;
            }
            let other = body_aabb(&bodies[j]);
            if aabb::aabb_penetrates(&body_aabb(&bodies[i]), &other) {
                push_body_out(&mut bodies[i], &other);
                pushes += 1;
            }
        }
    }
    pushes
}

// ============================================================================
// STEPPING
// ============================================================================

/// Advance one body by one tick: gravity, displacement, then world push-out
pub fn step_body(body: &mut BodyData, world: &World, physics: &PhysicsConfig, scale: f32) {
    body.on_ground = false;
    apply_gravity(body, physics);
    integrate(body, scale);
    resolve_world_collisions(body, world);
}

/// Advance every body, then separate bodies from each other
pub fn step_bodies(bodies: &mut [BodyData], world: &World, physics: &PhysicsConfig, scale: f32) {
    for body in bodies.iter_mut() {
        step_body(body, world, physics, scale);
    }
    resolve_body_collisions(bodies);
}
