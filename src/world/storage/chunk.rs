//! Chunk - a vertical column of the world backed by a block store.

use super::block_store_data::BlockStoreData;
use super::block_store_operations as store_ops;
use crate::world::core::{
    Block, BlockExtra, BlockId, ChunkGeometry, ChunkPos, Directions, LocalPos, WorldPos,
};
use crate::world::error::{WorldError, WorldResult};
use cgmath::Point3;

/// A block together with its exposed faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleBlock {
    pub block: Block,
    pub faces: Directions,
}

#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkPos,
    origin: WorldPos,
    store: BlockStoreData,
    /// Exposed faces, recomputed by the world after every mutation
    visible: Vec<VisibleBlock>,
}

impl Chunk {
    pub fn new(position: ChunkPos, geometry: ChunkGeometry) -> Self {
        Self::with_store(position, store_ops::create_block_store(geometry))
    }

    pub fn with_store(position: ChunkPos, store: BlockStoreData) -> Self {
        Self {
            position,
            origin: store.geometry.chunk_origin(position),
            store,
            visible: Vec::new(),
        }
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// `"x,z"` registry key
    pub fn id(&self) -> String {
        self.position.key()
    }

    /// Min corner in world space, y = 0
    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn geometry(&self) -> ChunkGeometry {
        self.store.geometry
    }

    pub fn store(&self) -> &BlockStoreData {
        &self.store
    }

    pub fn contains_world_pos(&self, pos: WorldPos) -> bool {
        self.store.geometry.world_to_chunk(pos) == self.position
    }

    fn local(&self, pos: WorldPos) -> WorldResult<LocalPos> {
        if !self.contains_world_pos(pos) {
            return Err(WorldError::OutsideChunk {
                pos,
                chunk: self.position,
            });
        }
        self.store.geometry.world_to_local(pos)
    }

    pub fn get(&self, pos: WorldPos) -> WorldResult<Option<Block>> {
        let local = self.local(pos)?;
        let id = store_ops::get_block(&self.store, local)?;
        if id.is_void() {
            return Ok(None);
        }
        Ok(Some(Block {
            block_type: id,
            pos,
            extra: store_ops::get_extra(&self.store, local)?,
        }))
    }

    pub fn has(&self, pos: WorldPos) -> WorldResult<bool> {
        store_ops::has_block(&self.store, self.local(pos)?)
    }

    pub fn set(&mut self, pos: WorldPos, id: BlockId, extra: Option<BlockExtra>) -> WorldResult<()> {
        let local = self.local(pos)?;
        store_ops::set_block(&mut self.store, local, id, extra)?;
        Ok(())
    }

    pub fn place(&mut self, block: &Block) -> WorldResult<()> {
        self.set(block.pos, block.block_type, block.extra)
    }

    pub fn remove(&mut self, pos: WorldPos) -> WorldResult<Option<Block>> {
        let local = self.local(pos)?;
        Ok(store_ops::remove_block(&mut self.store, local)?.map(|(block_type, extra)| Block {
            block_type,
            pos,
            extra,
        }))
    }

    /// Occupied blocks in canonical index order
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        let geometry = self.store.geometry;
        let position = self.position;
        store_ops::occupied_blocks(&self.store).map(move |(local, block_type, extra)| Block {
            block_type,
            pos: geometry.local_to_world(position, local),
            extra,
        })
    }

    pub fn block_count(&self) -> usize {
        store_ops::occupied_count(&self.store)
    }

    pub fn visible_blocks(&self) -> &[VisibleBlock] {
        &self.visible
    }

    pub(crate) fn set_visible_blocks(&mut self, visible: Vec<VisibleBlock>) {
        self.visible = visible;
    }

    /// Replace the contents with another store of the same geometry
    pub(crate) fn replace_store(&mut self, store: BlockStoreData) {
        self.store = store;
    }

    /// Horizontal distance from a point to the chunk's footprint; zero inside
    pub fn footprint_distance(&self, point: Point3<f32>) -> f32 {
        let width = self.store.geometry.width() as f32;
        let min_x = self.origin.x as f32;
        let min_z = self.origin.z as f32;
        let closest_x = point.x.clamp(min_x, min_x + width);
        let closest_z = point.z.clamp(min_z, min_z + width);
        let dx = point.x - closest_x;
        let dz = point.z - closest_z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(x: i32, z: i32) -> Chunk {
        Chunk::new(ChunkPos::new(x, z), ChunkGeometry::new(16, 64).unwrap())
    }

    #[test]
    fn test_origin() {
        assert_eq!(chunk(-2, 3).origin(), WorldPos::new(-32, 0, 48));
        assert_eq!(chunk(-2, 3).id(), "-2,3");
    }

    #[test]
    fn test_world_space_access_with_negative_coords() {
        let mut c = chunk(-1, -1);
        let pos = WorldPos::new(-1, 4, -16);
        c.set(pos, BlockId::Grass, None).unwrap();
        assert!(c.has(pos).unwrap());
        assert_eq!(c.get(pos).unwrap(), Some(Block::new(BlockId::Grass, pos)));
        assert_eq!(c.blocks().collect::<Vec<_>>(), vec![Block::new(BlockId::Grass, pos)]);
        assert_eq!(c.remove(pos).unwrap(), Some(Block::new(BlockId::Grass, pos)));
        assert_eq!(c.block_count(), 0);
    }

    #[test]
    fn test_rejects_foreign_positions() {
        let mut c = chunk(0, 0);
        let foreign = WorldPos::new(16, 0, 0);
        assert!(matches!(
            c.set(foreign, BlockId::Stone, None),
            Err(WorldError::OutsideChunk { .. })
        ));
        assert!(c.get(WorldPos::new(0, 64, 0)).is_err());
    }

    #[test]
    fn test_footprint_distance() {
        let c = chunk(0, 0);
        assert_eq!(c.footprint_distance(Point3::new(4.0, 100.0, 4.0)), 0.0);
        assert_eq!(c.footprint_distance(Point3::new(19.0, 0.0, 20.0)), 5.0);
    }
}
