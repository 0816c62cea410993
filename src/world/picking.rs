//! Ray picking - which block face the camera is aimed at.
//!
//! The ray vector handed in points from the target back toward the eye (see
//! `SphericalRotation::camera_ray_vector`), so valid hits lie at a
//! non-positive ray parameter.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use super::core::{Block, Direction, SphericalRotation, WorldPos};
use super::management::World;

/// Decimal places intersections are rounded to before the inside test
const INTERSECTION_PRECISION: f32 = 100_000.0;

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookingAt {
    pub block: Block,
    /// Face of `block` the ray hit
    pub face: Direction,
    pub opposite_face: Direction,
    /// Cell a block placed against the hit face would occupy
    pub new_block_pos: WorldPos,
    pub distance: f32,
}

fn round_point(point: Point3<f32>) -> Point3<f32> {
    point.map(|c| (c * INTERSECTION_PRECISION).round() / INTERSECTION_PRECISION)
}

fn is_inside_block(pos: WorldPos, point: Point3<f32>) -> bool {
    let min = pos.to_point();
    (0..3).all(|i| point[i] >= min[i] && point[i] <= min[i] + 1.0)
}

/// Squared distance at which the ray meets one face, if it does
fn face_hit(block: &Block, face: Direction, origin: Point3<f32>, ray_vector: Vector3<f32>) -> Option<f32> {
    let normal = face.normal();
    let on_face = block.pos.to_point() + normal.map(|n| n.max(0.0));
    let d = normal.dot(on_face.to_vec());
    let t = (d - normal.dot(origin.to_vec())) / normal.dot(ray_vector);
    if !t.is_finite() || t > 0.0 {
        return None;
    }

    let intersection = round_point(origin + ray_vector * t);
    if !is_inside_block(block.pos, intersection) {
        return None;
    }
    Some((intersection - origin).magnitude2())
}

/// Closest visible face along the ray within `max_reach`
pub fn looking_at(
    world: &World,
    origin: Point3<f32>,
    ray_vector: Vector3<f32>,
    max_reach: f32,
) -> Option<LookingAt> {
    let mut best: Option<(f32, Block, Direction)> = None;

    for chunk in world.chunks() {
        if chunk.footprint_distance(origin) > max_reach {
            continue;
        }
        for visible in chunk.visible_blocks() {
            for face in visible.faces.iter() {
                let Some(dist2) = face_hit(&visible.block, face, origin, ray_vector) else {
                    continue;
                };
                if best.map_or(true, |(current, _, _)| dist2 < current) {
                    best = Some((dist2, visible.block, face));
                }
            }
        }
    }

    let (dist2, block, face) = best?;
    let distance = dist2.sqrt();
    if distance > max_reach {
        log::trace!(
            "[picking::looking_at] Closest face at {:.2} is beyond reach {:.2}",
            distance,
            max_reach
        );
        return None;
    }

    Some(LookingAt {
        block,
        face,
        opposite_face: face.opposite(),
        new_block_pos: block.pos.offset(face),
        distance,
    })
}

/// Pick from a camera rotation rather than a raw ray vector
pub fn looking_at_rotation(
    world: &World,
    origin: Point3<f32>,
    rotation: SphericalRotation,
    max_reach: f32,
) -> Option<LookingAt> {
    looking_at(world, origin, rotation.camera_ray_vector(), max_reach)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockId, ChunkPos};
    use crate::world::storage::Chunk;
    use crate::EngineConfig;
    use std::f32::consts::PI;

    fn world_with_blocks(blocks: &[WorldPos]) -> World {
        let mut world = World::new(&EngineConfig::default()).unwrap();
        for x in -1..=0 {
            for z in -1..=0 {
                let chunk = Chunk::new(ChunkPos::new(x, z), world.geometry());
                world.insert_chunk(chunk);
            }
        }
        for pos in blocks {
            world.set_block(*pos, BlockId::Stone, None).unwrap();
        }
        world
    }

    #[test]
    fn test_looking_straight_down() {
        let world = world_with_blocks(&[WorldPos::new(0, 0, 0)]);
        let hit = looking_at_rotation(
            &world,
            Point3::new(0.5, 5.0, 0.5),
            SphericalRotation::new(0.0, PI),
            10.0,
        )
        .unwrap();

        assert_eq!(hit.block.pos, WorldPos::new(0, 0, 0));
        assert_eq!(hit.face, Direction::PosY);
        assert_eq!(hit.opposite_face, Direction::NegY);
        assert_eq!(hit.new_block_pos, WorldPos::new(0, 1, 0));
        assert!((hit.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_block_wins() {
        let world = world_with_blocks(&[WorldPos::new(0, 0, 0), WorldPos::new(0, 2, 0)]);
        let hit = looking_at_rotation(
            &world,
            Point3::new(0.5, 6.0, 0.5),
            SphericalRotation::new(0.0, PI),
            10.0,
        )
        .unwrap();
        assert_eq!(hit.block.pos, WorldPos::new(0, 2, 0));
        assert_eq!(hit.new_block_pos, WorldPos::new(0, 3, 0));
    }

    #[test]
    fn test_out_of_reach() {
        let world = world_with_blocks(&[WorldPos::new(0, 0, 0)]);
        let origin = Point3::new(0.5, 5.0, 0.5);
        let down = SphericalRotation::new(0.0, PI);
        assert!(looking_at_rotation(&world, origin, down, 3.5).is_none());
        assert!(looking_at_rotation(&world, origin, down, 4.5).is_some());
    }

    #[test]
    fn test_looking_away_finds_nothing() {
        let world = world_with_blocks(&[WorldPos::new(0, 0, 0)]);
        // Straight up from above the block
        let up = SphericalRotation::new(0.0, 0.0);
        assert!(looking_at_rotation(&world, Point3::new(0.5, 5.0, 0.5), up, 10.0).is_none());
    }

    #[test]
    fn test_side_face_hit() {
        let world = world_with_blocks(&[WorldPos::new(3, 1, 0)]);
        // Gaze along +x: ray vector points along -x
        let hit = looking_at(
            &world,
            Point3::new(0.5, 1.5, 0.5),
            Vector3::new(-1.0, 0.0, 0.0),
            10.0,
        )
        .unwrap();
        assert_eq!(hit.face, Direction::NegX);
        assert_eq!(hit.new_block_pos, WorldPos::new(2, 1, 0));
        assert!((hit.distance - 2.5).abs() < 1e-4);
    }
}
