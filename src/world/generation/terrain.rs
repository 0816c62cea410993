//! Terrain generation - fills chunks with biome-shaped columns and
//! decorates them with trees, clouds and flowers.
//!
//! Decorations are planted for every chunk in a 5x5 neighbourhood the first
//! time any chunk near it is generated, so a tree rooted in one chunk can
//! overhang another. Blocks aimed at a chunk that does not exist yet wait in
//! the pending table until that chunk is generated; blocks aimed at a chunk
//! generated earlier are handed back as spill for the world to merge.

use cgmath::Vector2;
use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeGenerator};
use super::context::{salt, GenerationContext};
use crate::constants::terrain::{
    CLOUD_JAG_FACTOR, CLOUD_MAX_THICKNESS, CLOUD_THRESHOLD, DECORATION_RADIUS, FLOWER_THRESHOLD,
    FOREST_TREE_THRESHOLD, GOLD_THRESHOLD, PLAINS_TREE_THRESHOLD, TRUNK_HEIGHT,
};
use crate::error::EngineResult;
use crate::world::core::{Block, BlockId, ChunkGeometry, ChunkPos, WorldPos};
use crate::world::serialization::SerializedBlock;
use crate::world::storage::Chunk;
use crate::{EngineConfig, TerrainConfig};

/// A freshly generated chunk plus decoration blocks for chunks that were
/// generated before it
#[derive(Debug, Clone)]
pub struct GeneratedChunk {
    pub chunk: Chunk,
    pub spill: Vec<Block>,
}

/// Pending decoration blocks for one chunk, keyed by its `"x,z"` id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChunkBlocks {
    pub chunk_pos: String,
    pub cubes: Vec<SerializedBlock>,
}

/// Serializable form of the pending table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSnapshot {
    pub blocks_to_render: Vec<PendingChunkBlocks>,
}

pub struct TerrainGenerator {
    context: GenerationContext,
    biomes: BiomeGenerator,
    terrain: TerrainConfig,
    geometry: ChunkGeometry,
    /// Decoration blocks waiting for their chunk to be generated. Chunks
    /// that are never generated keep their entry; nothing is evicted.
    pending: FxHashMap<ChunkPos, Vec<Block>>,
    decorated: FxHashSet<ChunkPos>,
    generated: FxHashSet<ChunkPos>,
}

impl TerrainGenerator {
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let geometry = config.geometry()?;
        let context = GenerationContext::new(config.seed, config.terrain.jag_factor);
        let biomes = BiomeGenerator::new(&context);
        log::info!(
            "[TerrainGenerator::new] Seed {}, flat world: {}",
            config.seed,
            config.terrain.flat_world
        );
        Ok(Self {
            context,
            biomes,
            terrain: config.terrain.clone(),
            geometry,
            pending: FxHashMap::default(),
            decorated: FxHashSet::default(),
            generated: FxHashSet::default(),
        })
    }

    pub fn geometry(&self) -> ChunkGeometry {
        self.geometry
    }

    pub fn is_generated(&self, pos: ChunkPos) -> bool {
        self.generated.contains(&pos)
    }

    pub fn pending_count(&self, pos: ChunkPos) -> usize {
        self.pending.get(&pos).map_or(0, Vec::len)
    }

    // ========================================================================
    // COLUMN QUERIES
    // ========================================================================

    pub fn biome_at(&mut self, x: i32, z: i32) -> Biome {
        self.biomes.biome_at(Vector2::new(x as f32, z as f32), &self.context)
    }

    /// Height of the top terrain block of a column
    pub fn surface_height(&mut self, x: i32, z: i32) -> i32 {
        if self.terrain.flat_world {
            return 0;
        }
        let max_height = self.biomes.height_at(Vector2::new(x as f32, z as f32), &self.context);
        let height = (self.context.noise01(x as f64, z as f64) * max_height as f64).floor() as i32;
        height.clamp(0, self.geometry.height() as i32 - 1)
    }

    /// Height a body can spawn at above a column
    pub fn spawn_height(&mut self, x: i32, z: i32) -> f32 {
        let surface = self.surface_height(x, z).max(self.terrain.water_level);
        surface as f32 + 2.0
    }

    // ========================================================================
    // CHUNK GENERATION
    // ========================================================================

    pub fn generate_chunk(&mut self, pos: ChunkPos) -> GeneratedChunk {
        if self.generated.contains(&pos) {
            log::warn!("[TerrainGenerator::generate_chunk] Chunk {} generated twice", pos);
        }
        let waiting = self.pending.remove(&pos).unwrap_or_default();

        let mut chunk = Chunk::new(pos, self.geometry);
        let origin = chunk.origin();
        let width = self.geometry.width() as i32;
        for dx in 0..width {
            for dz in 0..width {
                for block in self.column(origin.x + dx, origin.z + dz) {
                    write_block(&mut chunk, &block);
                }
            }
        }

        let mut spill = Vec::new();
        let mut own = Vec::new();
        for center in self.decoration_targets(pos) {
            for block in self.decorate(center) {
                let target = self.geometry.world_to_chunk(block.pos);
                if target == pos {
                    own.push(block);
                } else if self.generated.contains(&target) {
                    spill.push(block);
                } else {
                    self.pending.entry(target).or_default().push(block);
                }
            }
        }

        for block in waiting.iter().chain(own.iter()) {
            write_block(&mut chunk, block);
        }
        self.generated.insert(pos);

        log::debug!(
            "[TerrainGenerator::generate_chunk] Chunk {}: {} blocks, {} pending merged, {} spilled",
            pos,
            chunk.block_count(),
            waiting.len(),
            spill.len()
        );
        GeneratedChunk { chunk, spill }
    }

    /// Blocks of one terrain column
    fn column(&mut self, x: i32, z: i32) -> Vec<Block> {
        let height = self.surface_height(x, z);
        let biome = self.biome_at(x, z);
        let mut rng = self.context.rng_for(salt::COLUMN, x, z);
        let mut blocks = Vec::with_capacity(height as usize + 2);

        for y in 0..height {
            let id = if rng.gen::<f32>() > GOLD_THRESHOLD {
                BlockId::Gold
            } else {
                BlockId::Stone
            };
            blocks.push(Block::new(id, WorldPos::new(x, y, z)));
        }
        blocks.push(Block::new(biome.top_block(), WorldPos::new(x, height, z)));

        let water_level = self.terrain.water_level;
        for y in height + 1..=water_level {
            blocks.push(Block::new(BlockId::Water, WorldPos::new(x, y, z)));
        }

        if self.terrain.flowers && height >= water_level && rng.gen::<f32>() > FLOWER_THRESHOLD {
            blocks.push(Block::new(BlockId::RedFlower, WorldPos::new(x, height + 1, z)));
        }
        blocks
    }

    /// Chunks around `pos` that still need decorations, marking them done
    fn decoration_targets(&mut self, pos: ChunkPos) -> Vec<ChunkPos> {
        let mut targets = Vec::new();
        for dx in -DECORATION_RADIUS..=DECORATION_RADIUS {
            for dz in -DECORATION_RADIUS..=DECORATION_RADIUS {
                let target = pos.offset(dx, dz);
                if self.generated.contains(&target) || !self.decorated.insert(target) {
                    continue;
                }
                targets.push(target);
            }
        }
        targets
    }

    /// Trees and clouds rooted in one chunk
    fn decorate(&mut self, pos: ChunkPos) -> Vec<Block> {
        let mut rng = self.context.rng_for(salt::DECORATION, pos.x, pos.z);
        let origin = self.geometry.chunk_origin(pos);
        let width = self.geometry.width() as i32;
        let mut blocks = Vec::new();

        for dx in 0..width {
            for dz in 0..width {
                let (x, z) = (origin.x + dx, origin.z + dz);
                let height = self.surface_height(x, z);
                let root = WorldPos::new(x, height, z);

                let tree_threshold = match self.biome_at(x, z) {
                    Biome::Forest => Some(FOREST_TREE_THRESHOLD),
                    Biome::Plains if height > self.terrain.water_level => Some(PLAINS_TREE_THRESHOLD),
                    Biome::Plains | Biome::Mountain => None,
                };
                if let Some(threshold) = tree_threshold {
                    if rng.gen::<f32>() > threshold && self.terrain.trees {
                        blocks.extend(tree(root));
                    }
                }

                if rng.gen::<f32>() > CLOUD_THRESHOLD && self.terrain.clouds {
                    blocks.extend(self.cloud(root, &mut rng));
                }
            }
        }
        blocks
    }

    fn cloud(&self, root: WorldPos, rng: &mut StdRng) -> Vec<Block> {
        let width = rng.gen_range(2..=6);
        let length = rng.gen_range(5..=10);
        let base = WorldPos::new(root.x, self.terrain.cloud_level, root.z);
        let mut blocks = Vec::new();

        for i in 0..width {
            for j in 0..length {
                let cell = base.translated(i, 0, j);
                let noise = self
                    .context
                    .cloud_noise01(cell.x as f64, cell.z as f64, CLOUD_JAG_FACTOR);
                let thickness = (noise * CLOUD_MAX_THICKNESS).floor() as i32;
                if thickness < 1 {
                    continue;
                }
                for k in 0..=thickness {
                    blocks.push(Block::new(BlockId::Cloud, cell.translated(0, k, 0)));
                }
            }
        }
        blocks
    }

    // ========================================================================
    // PENDING TABLE
    // ========================================================================

    /// Pending blocks in chunk-coordinate order
    pub fn pending_snapshot(&self) -> PendingSnapshot {
        let mut positions: Vec<&ChunkPos> = self.pending.keys().collect();
        positions.sort_by_key(|pos| (pos.x, pos.z));
        PendingSnapshot {
            blocks_to_render: positions
                .into_iter()
                .map(|pos| PendingChunkBlocks {
                    chunk_pos: pos.key(),
                    cubes: self.pending[pos].iter().map(|b| SerializedBlock::from(*b)).collect(),
                })
                .collect(),
        }
    }

    /// Merge a snapshot into the pending table
    pub fn restore_pending(&mut self, snapshot: &PendingSnapshot) -> EngineResult<()> {
        for entry in &snapshot.blocks_to_render {
            let pos: ChunkPos = entry.chunk_pos.parse()?;
            self.pending
                .entry(pos)
                .or_default()
                .extend(entry.cubes.iter().map(|cube| Block::from(*cube)));
        }
        log::debug!(
            "[TerrainGenerator::restore_pending] Restored blocks for {} chunks",
            snapshot.blocks_to_render.len()
        );
        Ok(())
    }
}

/// Trunk above `root` with a 3x3x3 leaf crown around its top
fn tree(root: WorldPos) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(TRUNK_HEIGHT as usize + 25);
    for y in 1..=TRUNK_HEIGHT {
        blocks.push(Block::new(BlockId::Wood, root.translated(0, y, 0)));
    }

    let top = root.translated(0, TRUNK_HEIGHT, 0);
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 && dy <= 0 {
                    continue;
                }
                blocks.push(Block::new(BlockId::Leaf, top.translated(dx, dy, dz)));
            }
        }
    }
    blocks
}

fn write_block(chunk: &mut Chunk, block: &Block) {
    if let Err(e) = chunk.place(block) {
        log::trace!(
            "[TerrainGenerator::write_block] Skipping {} at {}: {}",
            block.block_type,
            block.pos,
            e
        );
    }
}
