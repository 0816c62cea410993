use super::direction::Direction;
use cgmath::{Point3, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult, OptionExt};

/// Integer block position in world space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, direction: Direction) -> Self {
        let o = direction.offset();
        self.translated(o.x, o.y, o.z)
    }

    pub fn translated(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Block containing a fine position
    pub fn containing(point: Point3<f32>) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    /// Min corner of the block's unit cube
    pub fn to_point(self) -> Point3<f32> {
        Point3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn xz(self) -> Vector2<f32> {
        Vector2::new(self.x as f32, self.z as f32)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Horizontal chunk coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// The four horizontally adjacent chunks
    pub fn neighbors(self) -> [ChunkPos; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// Canonical registry key, `"x,z"`
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

impl FromStr for ChunkPos {
    type Err = EngineError;

    fn from_str(key: &str) -> EngineResult<Self> {
        let parse_error = || EngineError::ParseError {
            value: key.to_string(),
            expected_type: "chunk key".to_string(),
        };
        let (x, z) = key.split_once(',').ok_or_engine(parse_error)?;
        let x = x.trim().parse::<i32>().map_err(|_| parse_error())?;
        let z = z.trim().parse::<i32>().map_err(|_| parse_error())?;
        Ok(Self::new(x, z))
    }
}

/// Chunk-local block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocalPos {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LocalPos {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_round_trip() {
        let pos = ChunkPos::new(-3, 12);
        assert_eq!(pos.key(), "-3,12");
        assert_eq!("-3,12".parse::<ChunkPos>().ok(), Some(pos));
    }

    #[test]
    fn test_chunk_key_rejects_garbage() {
        assert!("3".parse::<ChunkPos>().is_err());
        assert!("a,b".parse::<ChunkPos>().is_err());
    }

    #[test]
    fn test_containing_floors_negative() {
        let pos = WorldPos::containing(Point3::new(-0.5, 1.99, -1.0));
        assert_eq!(pos, WorldPos::new(-1, 1, -1));
    }

    #[test]
    fn test_offset() {
        let pos = WorldPos::new(4, 5, 6);
        assert_eq!(pos.offset(Direction::NegY), WorldPos::new(4, 4, 6));
        assert_eq!(pos.offset(Direction::PosZ), WorldPos::new(4, 5, 7));
    }
}
