//! World - registry of resident chunks.
//!
//! The world is the single writer of chunk contents. It translates world
//! positions to chunks, keeps cached face visibility current after every
//! mutation, drives asynchronous chunk loads and records which chunks changed.

use rustc_hash::FxHashMap;

use super::diff::ChunkDiff;
use super::loader::{ChunkDelivery, ChunkReader, LoadPolicy, LoadQueue, LoadRequest};
use crate::error::{EngineError, EngineResult, OptionExt};
use crate::physics::{aabb, body_operations, BodyData};
use crate::world::core::{
    Block, BlockExtra, BlockId, ChunkGeometry, ChunkPos, Direction, WorldPos,
};
use crate::world::error::{WorldError, WorldResult};
use crate::world::generation::{GeneratedChunk, TerrainGenerator};
use crate::world::serialization::SerializedChunk;
use crate::world::storage::Chunk;
use crate::world::visibility;
use crate::EngineConfig;

pub struct World {
    geometry: ChunkGeometry,
    occlude_unloaded: bool,
    chunks: FxHashMap<ChunkPos, Chunk>,
    loads: LoadQueue,
    /// Blocks aimed at chunks that are not resident yet. An entry drains
    /// only when its chunk is inserted; chunks are never unloaded, so entries
    /// for chunks that never arrive stay for the life of the world.
    deferred: FxHashMap<ChunkPos, Vec<Block>>,
    diff: ChunkDiff,
}

impl World {
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let geometry = config.geometry()?;
        log::info!(
            "[World::new] Creating world with {}x{}x{} chunks",
            geometry.width(),
            geometry.height(),
            geometry.width()
        );
        Ok(Self {
            geometry,
            occlude_unloaded: config.occlude_unloaded,
            chunks: FxHashMap::default(),
            loads: LoadQueue::new(),
            deferred: FxHashMap::default(),
            diff: ChunkDiff::new(),
        })
    }

    pub fn with_reader(mut self, reader: Box<dyn ChunkReader>) -> Self {
        self.set_reader(reader);
        self
    }

    pub fn set_reader(&mut self, reader: Box<dyn ChunkReader>) {
        self.loads.set_reader(reader);
    }

    pub fn geometry(&self) -> ChunkGeometry {
        self.geometry
    }

    /// Whether unloaded neighbours hide faces instead of exposing them
    pub fn occlude_unloaded(&self) -> bool {
        self.occlude_unloaded
    }

    // ========================================================================
    // COORDINATES
    // ========================================================================

    pub fn world_pos_to_chunk_pos(&self, pos: WorldPos) -> ChunkPos {
        self.geometry.world_to_chunk(pos)
    }

    /// Chunk min corner, or its horizontal centre when `centered`
    pub fn chunk_pos_to_world_pos(&self, chunk: ChunkPos, centered: bool) -> WorldPos {
        let origin = self.geometry.chunk_origin(chunk);
        if centered {
            let half = (self.geometry.width() / 2) as i32;
            origin.translated(half, 0, half)
        } else {
            origin
        }
    }

    // ========================================================================
    // CHUNK REGISTRY
    // ========================================================================

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Resident chunk containing a world position
    pub fn chunk_at(&self, pos: WorldPos) -> Option<&Chunk> {
        self.chunks.get(&self.world_pos_to_chunk_pos(pos))
    }

    /// Resident chunk containing `pos`; with `LoadIfMissing` an absent chunk
    /// is queued for loading and `None` is still returned
    pub fn get_chunk_from_world_point(&mut self, pos: WorldPos, policy: LoadPolicy) -> Option<&Chunk> {
        let chunk_pos = self.world_pos_to_chunk_pos(pos);
        if !self.chunks.contains_key(&chunk_pos) {
            if policy == LoadPolicy::LoadIfMissing {
                self.request_load(chunk_pos);
            }
            return None;
        }
        self.chunks.get(&chunk_pos)
    }

    pub fn is_resident(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn is_loading(&self, pos: ChunkPos) -> bool {
        self.loads.is_loading(pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn loading_count(&self) -> usize {
        self.loads.loading_count()
    }

    /// Blocks held for `pos` until that chunk becomes resident
    pub fn deferred_count(&self, pos: ChunkPos) -> usize {
        self.deferred.get(&pos).map_or(0, Vec::len)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Install a fully built chunk. A load still in flight for the same
    /// coordinate is released; its result is discarded when it arrives.
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        let pos = chunk.position();
        if self.chunks.contains_key(&pos) {
            log::debug!("[World::insert_chunk] Replacing resident chunk {}", pos);
        }
        self.chunks.insert(pos, chunk);
        self.loads.finish(pos, &Ok(()));

        if let Some(blocks) = self.deferred.remove(&pos) {
            log::debug!(
                "[World::insert_chunk] Merging {} deferred blocks into chunk {}",
                blocks.len(),
                pos
            );
            if let Some(chunk) = self.chunks.get_mut(&pos) {
                for block in blocks {
                    if let Err(e) = chunk.place(&block) {
                        log::warn!(
                            "[World::insert_chunk] Dropping deferred block at {}: {}",
                            block.pos,
                            e
                        );
                    }
                }
            }
        }

        self.refresh_visibility(pos);
        for neighbor in pos.neighbors() {
            self.refresh_visibility(neighbor);
        }
    }

    /// Install generator output, merging its spill into other chunks
    pub fn install_generated(&mut self, generated: GeneratedChunk) {
        self.insert_chunk(generated.chunk);
        for block in generated.spill {
            self.merge_spill(block);
        }
    }

    /// Generate a chunk synchronously, bypassing the reader
    pub fn generate_chunk_now(&mut self, generator: &mut TerrainGenerator, pos: ChunkPos) {
        if self.chunks.contains_key(&pos) {
            return;
        }
        let generated = generator.generate_chunk(pos);
        self.install_generated(generated);
    }

    /// Write a block into its chunk if resident, otherwise hold it until the
    /// chunk arrives
    fn merge_spill(&mut self, block: Block) {
        let target = self.world_pos_to_chunk_pos(block.pos);
        if self.chunks.contains_key(&target) {
            if let Err(e) = self.write_block(&block) {
                log::warn!("[World::merge_spill] Dropping block at {}: {}", block.pos, e);
            }
        } else {
            self.deferred.entry(target).or_default().push(block);
        }
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Ask the reader for a chunk. Idempotent for resident and loading chunks.
    pub fn request_load(&mut self, pos: ChunkPos) -> LoadRequest {
        if self.chunks.contains_key(&pos) {
            return LoadRequest::Resident;
        }
        let request = self.loads.start(pos);
        match request {
            LoadRequest::Started => log::debug!("[World::request_load] Loading chunk {}", pos),
            LoadRequest::NoReader => {
                log::warn!("[World::request_load] No chunk reader to load {}", pos)
            }
            _ => {}
        }
        request
    }

    /// Request every chunk within `distance` chunks of a position
    pub fn request_loads_around(&mut self, center: WorldPos, distance: i32) -> usize {
        let center = self.world_pos_to_chunk_pos(center);
        let mut started = 0;
        for dx in -distance..=distance {
            for dz in -distance..=distance {
                if self.request_load(center.offset(dx, dz)) == LoadRequest::Started {
                    started += 1;
                }
            }
        }
        started
    }

    /// Install every load that has already finished, without blocking
    pub fn pump_loads(&mut self) -> usize {
        let mut installed = 0;
        while let Some((pos, result)) = self.loads.poll_completed() {
            self.complete_load(pos, result);
            installed += 1;
        }
        installed
    }

    /// Load a chunk and wait until it is resident
    pub async fn load_chunk(&mut self, pos: ChunkPos) -> EngineResult<()> {
        if self.chunks.contains_key(&pos) {
            return Ok(());
        }
        if self.request_load(pos) == LoadRequest::NoReader {
            return Err(EngineError::StateError {
                expected: "chunk reader".to_string(),
                actual: "none configured".to_string(),
            });
        }
        let mut waiter = self
            .loads
            .subscribe(pos)
            .ok_or_engine(|| EngineError::StateError {
                expected: format!("chunk {} loading", pos),
                actual: "not loading".to_string(),
            })?;

        loop {
            if let Some(outcome) = waiter.try_recv()? {
                return outcome;
            }
            match self.loads.next_completed().await {
                Some((done, result)) => self.complete_load(done, result),
                None => {
                    return Err(EngineError::StateError {
                        expected: format!("load of chunk {} in flight", pos),
                        actual: "no loads in flight".to_string(),
                    })
                }
            }
        }
    }

    /// Blocking form of `load_chunk`
    pub fn load_chunk_blocking(&mut self, pos: ChunkPos) -> EngineResult<()> {
        pollster::block_on(self.load_chunk(pos))
    }

    fn complete_load(&mut self, pos: ChunkPos, result: EngineResult<ChunkDelivery>) {
        if !self.loads.is_loading(pos) {
            log::debug!("[World::complete_load] Discarding stale load of chunk {}", pos);
            return;
        }
        let outcome = result.and_then(|delivery| self.install_delivery(pos, delivery));
        if let Err(e) = &outcome {
            log::warn!("[World::complete_load] Rejected chunk {}: {}", pos, e);
        }
        self.loads.finish(pos, &outcome);
    }

    fn install_delivery(&mut self, pos: ChunkPos, delivery: ChunkDelivery) -> EngineResult<()> {
        let found = delivery.chunk.position();
        if found != pos {
            return Err(WorldError::ChunkMismatch { expected: pos, found }.into());
        }
        let chunk = Chunk::deserialize(&delivery.chunk, self.geometry)?;
        self.insert_chunk(chunk);
        for block in delivery.spill {
            self.merge_spill(block.into());
        }
        Ok(())
    }

    // ========================================================================
    // BLOCK ACCESS
    // ========================================================================

    pub fn get_block(&self, pos: WorldPos) -> Option<Block> {
        self.chunk_at(pos)?.get(pos).ok().flatten()
    }

    pub fn has_block(&self, pos: WorldPos) -> bool {
        self.get_block(pos).is_some()
    }

    /// Set a block; fails fast when its chunk is not resident
    pub fn set_block(&mut self, pos: WorldPos, id: BlockId, extra: Option<BlockExtra>) -> WorldResult<()> {
        self.write_block(&Block {
            block_type: id,
            pos,
            extra,
        })
    }

    pub fn place_block(&mut self, block: &Block) -> WorldResult<()> {
        self.write_block(block)
    }

    /// Place a block unless a tangible body overlaps its cell
    pub fn place_block_checked(&mut self, block: &Block, bodies: &[BodyData]) -> WorldResult<()> {
        let cell = aabb::aabb_for_block(block.pos);
        let obstructed = bodies
            .iter()
            .filter(|body| body.tangible)
            .any(|body| aabb::aabb_penetrates(&body_operations::body_aabb(body), &cell));
        if obstructed {
            return Err(WorldError::Obstructed(block.pos));
        }
        self.write_block(block)
    }

    /// Place a block, loading its chunk first if needed, then retry once
    pub async fn place_block_loading(&mut self, block: Block) -> EngineResult<()> {
        match self.write_block(&block) {
            Err(WorldError::ChunkNotLoaded(pos)) => {
                self.load_chunk(pos).await?;
                Ok(self.write_block(&block)?)
            }
            other => Ok(other?),
        }
    }

    pub fn remove_block(&mut self, pos: WorldPos) -> WorldResult<Option<Block>> {
        let chunk_pos = self.world_pos_to_chunk_pos(pos);
        let chunk = self
            .chunks
            .get_mut(&chunk_pos)
            .ok_or(WorldError::ChunkNotLoaded(chunk_pos))?;
        let removed = chunk.remove(pos)?;
        if removed.is_some() {
            self.after_mutation(pos);
        }
        Ok(removed)
    }

    fn write_block(&mut self, block: &Block) -> WorldResult<()> {
        let chunk_pos = self.world_pos_to_chunk_pos(block.pos);
        let chunk = self
            .chunks
            .get_mut(&chunk_pos)
            .ok_or(WorldError::ChunkNotLoaded(chunk_pos))?;
        chunk.place(block)?;
        self.after_mutation(block.pos);
        Ok(())
    }

    /// Refresh faces and mark dirty the chunk of `pos` and any chunk across
    /// the border it touches
    fn after_mutation(&mut self, pos: WorldPos) {
        let own = self.world_pos_to_chunk_pos(pos);
        self.refresh_visibility(own);
        self.diff.mark(own);

        if !self.geometry.is_chunk_border(pos) {
            return;
        }
        for direction in [
            Direction::PosX,
            Direction::NegX,
            Direction::PosZ,
            Direction::NegZ,
        ] {
            let neighbor = self.world_pos_to_chunk_pos(pos.offset(direction));
            if neighbor != own && self.chunks.contains_key(&neighbor) {
                self.refresh_visibility(neighbor);
                self.diff.mark(neighbor);
            }
        }
    }

    fn refresh_visibility(&mut self, pos: ChunkPos) {
        let visible = match self.chunks.get(&pos) {
            Some(chunk) => visibility::chunk_visible_faces(self, chunk),
            None => return,
        };
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            chunk.set_visible_blocks(visible);
        }
    }

    // ========================================================================
    // CHANGE TRACKING
    // ========================================================================

    pub fn diff(&self) -> &ChunkDiff {
        &self.diff
    }

    pub fn take_diff(&mut self) -> ChunkDiff {
        std::mem::take(&mut self.diff)
    }

    /// Serialized contents of every chunk changed since the last drain
    pub fn drain_chunk_updates(&mut self) -> Vec<SerializedChunk> {
        self.diff
            .drain()
            .into_iter()
            .filter_map(|pos| self.chunks.get(&pos).map(Chunk::serialize))
            .collect()
    }

    /// Replace a chunk with a remote update. Applied updates are not marked
    /// dirty again, so they are not echoed back.
    pub fn apply_chunk_update(&mut self, serialized: &SerializedChunk) -> EngineResult<()> {
        let update = Chunk::deserialize(serialized, self.geometry)?;
        let pos = update.position();
        match self.chunks.get_mut(&pos) {
            Some(chunk) => {
                chunk.replace_store(update.store().clone());
                self.refresh_visibility(pos);
                for neighbor in pos.neighbors() {
                    self.refresh_visibility(neighbor);
                }
            }
            None => self.insert_chunk(update),
        }
        Ok(())
    }
}
