//! World Module
//!
//! Block storage, chunk registry, generation and queries over the loaded
//! world.
//!
//! # Architecture Overview
//!
//! - **Core**: Fundamental data types (Block, positions, directions)
//! - **Storage**: Dense per-chunk block stores with sparse extras
//! - **Generation**: Biome grid and seeded terrain generator
//! - **Management**: World registry, asynchronous loading, change tracking
//! - **Visibility / Picking**: Exposed faces and the block the player looks at
//! - **Serialization**: Chunk wire and JSON formats

pub mod core;
pub mod error;
pub mod generation;
pub mod management;
pub mod picking;
pub mod serialization;
pub mod storage;
pub mod visibility;

// Re-export core types for convenience
pub use self::core::{
    Axis, Block, BlockExtra, BlockId, BlockMetadata, BlockShape, ChunkGeometry, ChunkPos,
    Direction, Directions, LocalPos, SphericalRotation, WorldPos,
};

pub use error::{WorldError, WorldResult};
pub use generation::{Biome, GeneratorChunkReader, TerrainGenerator};
pub use management::{ChunkDelivery, ChunkDiff, ChunkReader, LoadPolicy, LoadRequest, World};
pub use picking::{looking_at, looking_at_rotation, LookingAt};
pub use serialization::{SerializedBlock, SerializedChunk};
pub use storage::{Chunk, VisibleBlock};
