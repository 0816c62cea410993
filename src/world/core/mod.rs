//! Core world data types and fundamental structures
//!
//! This module contains the essential data types that form the foundation
//! of the world system: block types, positions, faces and chunk geometry.

mod block;
mod direction;
mod geometry;
mod position;
mod rotation;

pub use block::{Block, BlockExtra, BlockId, BlockMetadata, BlockShape};
pub use direction::{Axis, Direction, Directions, HALO_OFFSETS};
pub use geometry::ChunkGeometry;
pub use position::{ChunkPos, LocalPos, WorldPos};
pub use rotation::SphericalRotation;
