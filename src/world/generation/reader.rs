//! Chunk reader backed by a local terrain generator, for single-player
//! worlds and tests.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use super::terrain::TerrainGenerator;
use crate::error::{EngineError, EngineResult};
use crate::world::core::ChunkPos;
use crate::world::management::{ChunkDelivery, ChunkReader};
use crate::world::serialization::SerializedBlock;

/// Generates on request. The generator is shared so callers can still
/// query heights or snapshot its pending table.
#[derive(Clone)]
pub struct GeneratorChunkReader {
    generator: Rc<RefCell<TerrainGenerator>>,
}

impl GeneratorChunkReader {
    pub fn new(generator: Rc<RefCell<TerrainGenerator>>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Rc<RefCell<TerrainGenerator>> {
        &self.generator
    }

    fn generate(&self, pos: ChunkPos) -> EngineResult<ChunkDelivery> {
        let mut generator = self
            .generator
            .try_borrow_mut()
            .map_err(|_| EngineError::StateError {
                expected: "idle terrain generator".to_string(),
                actual: "generator already borrowed".to_string(),
            })?;
        let generated = generator.generate_chunk(pos);
        Ok(ChunkDelivery {
            chunk: generated.chunk.serialize(),
            spill: generated.spill.into_iter().map(SerializedBlock::from).collect(),
        })
    }
}

impl ChunkReader for GeneratorChunkReader {
    /// Generation runs on first poll, not when the request is queued
    fn get_chunk(&self, pos: ChunkPos) -> LocalBoxFuture<'static, EngineResult<ChunkDelivery>> {
        let reader = self.clone();
        future::lazy(move |_| reader.generate(pos)).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::WorldPos;
    use crate::world::management::{LoadPolicy, World};
    use crate::EngineConfig;

    fn flat_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.terrain.flat_world = true;
        config.terrain.trees = false;
        config.terrain.flowers = false;
        config
    }

    #[test]
    fn test_world_loads_through_generator() {
        let config = flat_config();
        let generator = Rc::new(RefCell::new(TerrainGenerator::new(&config).unwrap()));
        let mut world = World::new(&config)
            .unwrap()
            .with_reader(Box::new(GeneratorChunkReader::new(Rc::clone(&generator))));

        world.load_chunk_blocking(ChunkPos::new(0, 0)).unwrap();
        assert!(world.has_block(WorldPos::new(5, 0, 5)));
        assert!(!world.has_block(WorldPos::new(5, 1, 5)));
        assert!(generator.borrow().is_generated(ChunkPos::new(0, 0)));
    }

    #[test]
    fn test_load_if_missing_defers_generation_to_pump() {
        let config = flat_config();
        let generator = Rc::new(RefCell::new(TerrainGenerator::new(&config).unwrap()));
        let mut world = World::new(&config)
            .unwrap()
            .with_reader(Box::new(GeneratorChunkReader::new(Rc::clone(&generator))));
        let pos = WorldPos::new(5, 0, 5);

        assert!(world.get_chunk_from_world_point(pos, LoadPolicy::LoadIfMissing).is_none());
        assert!(world.is_loading(ChunkPos::new(0, 0)));
        assert!(!generator.borrow().is_generated(ChunkPos::new(0, 0)));

        assert_eq!(world.pump_loads(), 1);
        assert!(generator.borrow().is_generated(ChunkPos::new(0, 0)));
        assert!(world.has_block(pos));
    }

    #[test]
    fn test_busy_generator_reports_error() {
        let config = flat_config();
        let generator = Rc::new(RefCell::new(TerrainGenerator::new(&config).unwrap()));
        let reader = GeneratorChunkReader::new(Rc::clone(&generator));
        let _held = generator.borrow_mut();
        let result = pollster::block_on(reader.get_chunk(ChunkPos::new(0, 0)));
        assert!(matches!(result, Err(EngineError::StateError { .. })));
    }
}
