//! Face visibility
//!
//! Decides which faces of a block are exposed. The same predicate feeds the
//! block picker and any external mesher.

use super::core::{Block, BlockShape, Direction, Directions};
use super::management::World;
use super::storage::{Chunk, VisibleBlock};

/// Faces a block could show at all
pub fn obscuring_directions(block: &Block) -> Directions {
    match block.shape() {
        BlockShape::Cube | BlockShape::Fluid | BlockShape::XCross => Directions::ALL,
        BlockShape::Flat => block
            .orientation()
            .map(Directions::only)
            .unwrap_or(Directions::NONE),
    }
}

/// Whether the face of `block` pointing along `direction` is exposed
pub fn is_face_visible(world: &World, block: &Block, direction: Direction) -> bool {
    let neighbor_pos = block.pos.offset(direction);
    if neighbor_pos.y < 0 {
        return true;
    }

    let Some(chunk) = world.chunk_at(neighbor_pos) else {
        return !world.occlude_unloaded();
    };

    match chunk.get(neighbor_pos) {
        Ok(Some(neighbor)) => !occludes(block, &neighbor, direction),
        // Empty cell or above the world
        _ => true,
    }
}

fn occludes(block: &Block, neighbor: &Block, direction: Direction) -> bool {
    if block.block_type.is_fluid() && neighbor.block_type.is_fluid() {
        return false;
    }
    if neighbor.shape() == BlockShape::Flat && neighbor.orientation() != Some(direction) {
        return false;
    }
    !neighbor.block_type.is_transparent()
}

pub fn visible_faces(world: &World, block: &Block) -> Directions {
    obscuring_directions(block)
        .iter()
        .filter(|direction| is_face_visible(world, block, *direction))
        .collect()
}

/// Blocks of a chunk with at least one exposed face, in index order
pub fn chunk_visible_faces(world: &World, chunk: &Chunk) -> Vec<VisibleBlock> {
    chunk
        .blocks()
        .filter_map(|block| {
            let faces = visible_faces(world, &block);
            (!faces.is_empty()).then_some(VisibleBlock { block, faces })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockExtra, BlockId, ChunkPos, WorldPos};
    use crate::EngineConfig;

    fn world_with(config: EngineConfig) -> World {
        let mut world = World::new(&config).unwrap();
        for x in -1..=1 {
            for z in -1..=1 {
                let chunk = Chunk::new(ChunkPos::new(x, z), world.geometry());
                world.insert_chunk(chunk);
            }
        }
        world
    }

    fn world() -> World {
        world_with(EngineConfig::default())
    }

    fn faces_at(world: &World, pos: WorldPos) -> Directions {
        let block = world.get_block(pos).unwrap();
        visible_faces(world, &block)
    }

    #[test]
    fn test_isolated_block_shows_all_faces() {
        let mut world = world();
        let pos = WorldPos::new(4, 10, 4);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        assert_eq!(faces_at(&world, pos), Directions::ALL);
    }

    #[test]
    fn test_enclosed_block_shows_nothing() {
        let mut world = world();
        let pos = WorldPos::new(0, 10, 0);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        for direction in Direction::ALL {
            world.set_block(pos.offset(direction), BlockId::Gold, None).unwrap();
        }
        assert!(faces_at(&world, pos).is_empty());
        assert!(world
            .chunk(ChunkPos::new(0, 0))
            .unwrap()
            .visible_blocks()
            .iter()
            .all(|visible| visible.block.pos != pos));
    }

    #[test]
    fn test_bottom_of_world_is_open() {
        let mut world = world();
        let pos = WorldPos::new(3, 0, 3);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        world.set_block(pos.offset(Direction::PosY), BlockId::Stone, None).unwrap();
        let faces = faces_at(&world, pos);
        assert!(faces.contains(Direction::NegY));
        assert!(!faces.contains(Direction::PosY));
    }

    #[test]
    fn test_transparent_neighbor_does_not_occlude() {
        let mut world = world();
        let pos = WorldPos::new(3, 5, 3);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        world.set_block(pos.offset(Direction::PosX), BlockId::Leaf, None).unwrap();
        world.set_block(pos.offset(Direction::NegX), BlockId::RedFlower, None).unwrap();
        let faces = faces_at(&world, pos);
        assert!(faces.contains(Direction::PosX));
        assert!(faces.contains(Direction::NegX));
    }

    #[test]
    fn test_adjacent_fluids_stay_visible() {
        let mut world = world();
        let pos = WorldPos::new(3, 5, 3);
        world.set_block(pos, BlockId::Water, None).unwrap();
        world.set_block(pos.offset(Direction::PosZ), BlockId::Water, None).unwrap();
        assert!(faces_at(&world, pos).contains(Direction::PosZ));
    }

    #[test]
    fn test_flat_neighbor_occludes_only_matching_face() {
        let mut world = world();
        let pos = WorldPos::new(3, 5, 3);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        let image = |face| BlockExtra::Image {
            face,
            gallery_index: 0,
        };
        world
            .set_block(pos.offset(Direction::PosX), BlockId::Image, Some(image(Direction::PosX)))
            .unwrap();
        world
            .set_block(pos.offset(Direction::NegX), BlockId::Image, Some(image(Direction::PosZ)))
            .unwrap();
        let faces = faces_at(&world, pos);
        assert!(!faces.contains(Direction::PosX));
        assert!(faces.contains(Direction::NegX));
    }

    #[test]
    fn test_flat_block_only_obscures_its_orientation() {
        let block = Block::with_extra(
            BlockId::Image,
            WorldPos::new(0, 0, 0),
            BlockExtra::Image {
                face: Direction::NegZ,
                gallery_index: 1,
            },
        );
        assert_eq!(obscuring_directions(&block), Directions::only(Direction::NegZ));
        let flower = Block::new(BlockId::RedFlower, WorldPos::new(0, 0, 0));
        assert_eq!(obscuring_directions(&flower), Directions::ALL);
    }

    #[test]
    fn test_unloaded_neighbor_policy() {
        let mut world = world();
        // x = 31 borders the unloaded chunk (2, 0)
        let pos = WorldPos::new(31, 5, 0);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        assert!(faces_at(&world, pos).contains(Direction::PosX));

        let mut config = EngineConfig::default();
        config.occlude_unloaded = true;
        let mut world = world_with(config);
        world.set_block(pos, BlockId::Stone, None).unwrap();
        assert!(!faces_at(&world, pos).contains(Direction::PosX));
    }
}
