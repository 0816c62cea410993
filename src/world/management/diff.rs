//! Dirty-chunk tracking for broadcasting world changes between ticks.

use rustc_hash::FxHashSet;

use crate::world::core::ChunkPos;

/// Chunks touched since the last drain, in first-touch order.
///
/// Sync is last-writer-wins: a chunk is listed once no matter how often it
/// changed, and receivers replace their copy with the latest contents.
#[derive(Debug, Clone, Default)]
pub struct ChunkDiff {
    order: Vec<ChunkPos>,
    dirty: FxHashSet<ChunkPos>,
}

impl ChunkDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, pos: ChunkPos) {
        if self.dirty.insert(pos) {
            self.order.push(pos);
        }
    }

    pub fn is_dirty(&self, pos: ChunkPos) -> bool {
        self.dirty.contains(&pos)
    }

    pub fn dirty_chunks(&self) -> &[ChunkPos] {
        &self.order
    }

    /// Chunk ids as used on the wire
    pub fn dirty_chunk_ids(&self) -> Vec<String> {
        self.order.iter().map(|pos| pos.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.dirty.clear();
    }

    /// Merge another diff, keeping this one's order first
    pub fn append(&mut self, other: ChunkDiff) {
        for pos in other.order {
            self.mark(pos);
        }
    }

    pub fn drain(&mut self) -> Vec<ChunkPos> {
        self.dirty.clear();
        std::mem::take(&mut self.order)
    }
}
