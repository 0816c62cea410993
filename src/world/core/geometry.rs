//! Chunk dimensions and the coordinate transforms that depend on them.

use super::position::{ChunkPos, LocalPos, WorldPos};
use crate::constants::core::MAX_DIMENSION;
use crate::world::error::{WorldError, WorldResult};

/// Chunk dimensions with the bit widths used for index packing.
///
/// Width (x and z) and height (y) must be powers of two so that packing is a
/// plain shift-or and unpacking a shift-mask, and at most `MAX_DIMENSION` so
/// a packed index fits in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkGeometry {
    width: u32,
    height: u32,
    width_bits: u32,
    height_bits: u32,
}

impl ChunkGeometry {
    pub fn new(width: u32, height: u32) -> WorldResult<Self> {
        for dimension in [width, height] {
            if !dimension.is_power_of_two() || dimension > MAX_DIMENSION {
                return Err(WorldError::InvalidDimension(dimension));
            }
        }
        Ok(Self {
            width,
            height,
            width_bits: width.trailing_zeros(),
            height_bits: height.trailing_zeros(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells in one chunk
    pub fn volume(&self) -> usize {
        (self.width as usize) * (self.width as usize) * (self.height as usize)
    }

    pub fn contains_local(&self, local: LocalPos) -> bool {
        local.x < self.width && local.y < self.height && local.z < self.width
    }

    pub fn contains_height(&self, y: i32) -> bool {
        y >= 0 && (y as i64) < self.height as i64
    }

    /// `x << (height_bits + width_bits) | y << width_bits | z`
    pub fn pack(&self, local: LocalPos) -> WorldResult<usize> {
        if !self.contains_local(local) {
            return Err(WorldError::LocalOutOfBounds {
                x: local.x,
                y: local.y,
                z: local.z,
                width: self.width,
                height: self.height,
            });
        }
        let index = (local.x << (self.height_bits + self.width_bits))
            | (local.y << self.width_bits)
            | local.z;
        Ok(index as usize)
    }

    pub fn unpack(&self, index: usize) -> WorldResult<LocalPos> {
        if index >= self.volume() {
            return Err(WorldError::IndexOutOfBounds {
                index,
                volume: self.volume(),
            });
        }
        let index = index as u32;
        let width_mask = self.width - 1;
        let height_mask = self.height - 1;
        Ok(LocalPos::new(
            index >> (self.height_bits + self.width_bits),
            (index >> self.width_bits) & height_mask,
            index & width_mask,
        ))
    }

    /// Floor division of x and z by the chunk width
    pub fn world_to_chunk(&self, pos: WorldPos) -> ChunkPos {
        let width = self.width as i32;
        ChunkPos::new(pos.x.div_euclid(width), pos.z.div_euclid(width))
    }

    /// Min corner of a chunk at y = 0
    pub fn chunk_origin(&self, chunk: ChunkPos) -> WorldPos {
        let width = self.width as i32;
        WorldPos::new(chunk.x * width, 0, chunk.z * width)
    }

    /// Chunk-local coordinate for a world position; y passes through but must
    /// be inside the world
    pub fn world_to_local(&self, pos: WorldPos) -> WorldResult<LocalPos> {
        if !self.contains_height(pos.y) {
            return Err(WorldError::HeightOutOfBounds {
                y: pos.y,
                height: self.height,
            });
        }
        let width = self.width as i32;
        Ok(LocalPos::new(
            (((pos.x % width) + width) % width) as u32,
            pos.y as u32,
            (((pos.z % width) + width) % width) as u32,
        ))
    }

    pub fn local_to_world(&self, chunk: ChunkPos, local: LocalPos) -> WorldPos {
        let origin = self.chunk_origin(chunk);
        WorldPos::new(
            origin.x + local.x as i32,
            local.y as i32,
            origin.z + local.z as i32,
        )
    }

    /// True when the position lies on a chunk's x or z boundary column
    pub fn is_chunk_border(&self, pos: WorldPos) -> bool {
        let width = self.width as i32;
        let lx = pos.x.rem_euclid(width);
        let lz = pos.z.rem_euclid(width);
        lx == 0 || lx == width - 1 || lz == 0 || lz == width - 1
    }
}
