//! Procedural world generation
//!
//! - context.rs: seeded noise and random streams
//! - biome.rs: biome macro grid and height blending
//! - terrain.rs: chunk fill and cross-chunk decorations
//! - reader.rs: generator exposed as a chunk reader

pub mod biome;
pub mod context;
pub mod reader;
pub mod terrain;

pub use biome::{Biome, BiomeGenerator, BiomeSeed, MacroSection, SectionPos};
pub use context::GenerationContext;
pub use reader::GeneratorChunkReader;
pub use terrain::{GeneratedChunk, PendingChunkBlocks, PendingSnapshot, TerrainGenerator};
