/// World Error Handling
///
/// Errors raised by block storage, chunk bookkeeping and the world registry.
use super::core::{BlockId, ChunkPos, WorldPos};

/// World-specific result type
pub type WorldResult<T> = Result<T, WorldError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("Chunk {0} not loaded")]
    ChunkNotLoaded(ChunkPos),

    #[error("Local position ({x}, {y}, {z}) outside chunk bounds {width}x{height}")]
    LocalOutOfBounds {
        x: u32,
        y: u32,
        z: u32,
        width: u32,
        height: u32,
    },

    #[error("Block index {index} outside chunk volume {volume}")]
    IndexOutOfBounds { index: usize, volume: usize },

    #[error("Height {y} outside world height {height}")]
    HeightOutOfBounds { y: i32, height: u32 },

    #[error("Position {pos} does not belong to chunk {chunk}")]
    OutsideChunk { pos: WorldPos, chunk: ChunkPos },

    #[error("{block} blocks require an orientation")]
    MissingOrientation { block: BlockId },

    #[error("Block at {0} is obstructed by a body")]
    Obstructed(WorldPos),

    #[error("Chunk payload for {found} does not match requested chunk {expected}")]
    ChunkMismatch { expected: ChunkPos, found: ChunkPos },

    #[error("Malformed chunk: {0}")]
    MalformedChunk(String),

    #[error("Invalid chunk dimension {0}: must be a power of two between 1 and 256")]
    InvalidDimension(u32),
}

/// Error context for world operations
pub trait WorldErrorContext<T> {
    fn world_context(self, context: &str) -> WorldResult<T>;
}

impl<T, E> WorldErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn world_context(self, context: &str) -> WorldResult<T> {
        self.map_err(|e| WorldError::MalformedChunk(format!("{}: {}", context, e)))
    }
}
