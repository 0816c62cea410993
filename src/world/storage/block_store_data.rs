//! Block Store Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in block_store_operations.rs

use rustc_hash::FxHashMap;

use crate::world::core::{BlockExtra, BlockId, ChunkGeometry};

/// Dense block array of one chunk plus its sparse extras.
///
/// `blocks` is indexed by `ChunkGeometry::pack`. Every key of `extras` refers
/// to a non-void cell, and `occupied` counts the non-void cells.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStoreData {
    pub geometry: ChunkGeometry,
    pub blocks: Vec<BlockId>,
    pub extras: FxHashMap<usize, BlockExtra>,
    pub occupied: usize,
}
