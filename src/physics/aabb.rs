/// Data-Oriented Axis-Aligned Bounding Box System
///
/// Pure functions for collision detection - no methods, just data transformations.
///
/// Intervals are closed: boxes that share a face count as colliding. That is
/// what lets a body resting on a block keep registering its ground contact.
/// Positive-volume overlap is the stricter `aabb_penetrates`.
use cgmath::{Point3, Vector3};

use crate::world::core::{Axis, Direction, WorldPos};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Which face of the mover was pushed: `Negative` is its min face (the
/// bottom on y), `Positive` its max face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSide {
    Negative,
    Positive,
}

/// Axis and side a push-out resolved along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceHit {
    pub axis: Axis,
    pub direction: HitSide,
}

impl FaceHit {
    /// Face of the mover that made contact
    pub fn face(&self) -> Direction {
        Direction::from_axis(self.axis, self.direction == HitSide::Positive)
    }

    /// Mover landed on top of the blocker
    pub fn is_ground(&self) -> bool {
        self.axis == Axis::Y && self.direction == HitSide::Negative
    }
}

/// Create AABB from min corner and size
/// Pure function - constructs AABB data structure
pub fn aabb_from_position_dimension(position: Point3<f32>, dimension: Vector3<f32>) -> AABB {
    AABB {
        min: position,
        max: position + dimension,
    }
}

/// Unit cube occupied by a block
pub fn aabb_for_block(pos: WorldPos) -> AABB {
    aabb_from_position_dimension(pos.to_point(), Vector3::new(1.0, 1.0, 1.0))
}

/// Size of an AABB
pub fn aabb_dimension(aabb: &AABB) -> Vector3<f32> {
    aabb.max - aabb.min
}

/// Test if two AABBs intersect, touching faces included
/// Pure function - tests intersection between two AABB data structures
pub fn aabb_intersects(aabb1: &AABB, aabb2: &AABB) -> bool {
    aabb1.min.x <= aabb2.max.x && aabb1.max.x >= aabb2.min.x &&
    aabb1.min.y <= aabb2.max.y && aabb1.max.y >= aabb2.min.y &&
    aabb1.min.z <= aabb2.max.z && aabb1.max.z >= aabb2.min.z
}

/// Test if two AABBs overlap with positive volume
pub fn aabb_penetrates(aabb1: &AABB, aabb2: &AABB) -> bool {
    aabb1.min.x < aabb2.max.x && aabb1.max.x > aabb2.min.x &&
    aabb1.min.y < aabb2.max.y && aabb1.max.y > aabb2.min.y &&
    aabb1.min.z < aabb2.max.z && aabb1.max.z > aabb2.min.z
}

/// Translate AABB by offset (mutating)
/// Function - transforms AABB data by offset
pub fn aabb_translate(aabb: &mut AABB, offset: Vector3<f32>) {
    aabb.min += offset;
    aabb.max += offset;
}

/// Move `mover` out of `blocker` along the single axis and side with the
/// smallest face gap, leaving the two boxes face-adjacent.
///
/// Candidates are tried x, y, z and for each the min face before the max
/// face; the first strict minimum wins.
pub fn aabb_push_out(mover: &mut AABB, blocker: &AABB) -> FaceHit {
    let mut best = (f32::INFINITY, Axis::X, HitSide::Negative);

    for axis in Axis::ALL {
        let i = axis.index();
        for side in [HitSide::Negative, HitSide::Positive] {
            let (mover_face, blocker_face) = match side {
                HitSide::Negative => (mover.min[i], blocker.max[i]),
                HitSide::Positive => (mover.max[i], blocker.min[i]),
            };
            let gap = (blocker_face - mover_face).abs();
            if gap < best.0 {
                best = (gap, axis, side);
            }
        }
    }

    let (_, axis, direction) = best;
    let i = axis.index();
    let size = mover.max[i] - mover.min[i];
    match direction {
        HitSide::Negative => mover.min[i] = blocker.max[i],
        HitSide::Positive => mover.min[i] = blocker.min[i] - size,
    }
    mover.max[i] = mover.min[i] + size;

    FaceHit { axis, direction }
}
