use serde::{Deserialize, Serialize};
use std::fmt;

use super::direction::Direction;
use super::position::WorldPos;
use crate::error::EngineError;

/// Block type identifier.
///
/// The discriminant is the wire id stored in serialized chunks, so the values
/// must never be renumbered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bytemuck::NoUninit,
    bytemuck::CheckedBitPattern,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum BlockId {
    #[default]
    Void = 0,
    Stone = 1,
    Wood = 2,
    Leaf = 3,
    Cloud = 4,
    Gold = 5,
    RedFlower = 6,
    Water = 7,
    Grass = 8,
    Image = 9,
}

static_assertions::assert_eq_size!(BlockId, u8);

/// Geometry class of a block; drives occlusion and meshing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockShape {
    Cube,
    Fluid,
    /// Single decal quad facing its stored orientation
    Flat,
    /// Two crossed quads, e.g. flowers
    XCross,
}

/// Static per-type properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMetadata {
    pub name: &'static str,
    pub shape: BlockShape,
    pub transparent: bool,
    pub intangible: bool,
}

const fn solid(name: &'static str) -> BlockMetadata {
    BlockMetadata {
        name,
        shape: BlockShape::Cube,
        transparent: false,
        intangible: false,
    }
}

const VOID: BlockMetadata = BlockMetadata {
    name: "Void",
    shape: BlockShape::Cube,
    transparent: true,
    intangible: true,
};
const STONE: BlockMetadata = solid("Stone");
const WOOD: BlockMetadata = solid("Wood");
const LEAF: BlockMetadata = BlockMetadata {
    name: "Leaf",
    shape: BlockShape::Cube,
    transparent: true,
    intangible: false,
};
const CLOUD: BlockMetadata = solid("Cloud");
const GOLD: BlockMetadata = solid("Gold");
const RED_FLOWER: BlockMetadata = BlockMetadata {
    name: "Red Flower",
    shape: BlockShape::XCross,
    transparent: true,
    intangible: true,
};
const WATER: BlockMetadata = BlockMetadata {
    name: "Water",
    shape: BlockShape::Fluid,
    transparent: true,
    intangible: true,
};
const GRASS: BlockMetadata = solid("Grass");
const IMAGE: BlockMetadata = BlockMetadata {
    name: "Image",
    shape: BlockShape::Flat,
    transparent: false,
    intangible: false,
};

impl BlockId {
    pub const ALL: [BlockId; 10] = [
        BlockId::Void,
        BlockId::Stone,
        BlockId::Wood,
        BlockId::Leaf,
        BlockId::Cloud,
        BlockId::Gold,
        BlockId::RedFlower,
        BlockId::Water,
        BlockId::Grass,
        BlockId::Image,
    ];

    pub fn metadata(self) -> &'static BlockMetadata {
        match self {
            BlockId::Void => &VOID,
            BlockId::Stone => &STONE,
            BlockId::Wood => &WOOD,
            BlockId::Leaf => &LEAF,
            BlockId::Cloud => &CLOUD,
            BlockId::Gold => &GOLD,
            BlockId::RedFlower => &RED_FLOWER,
            BlockId::Water => &WATER,
            BlockId::Grass => &GRASS,
            BlockId::Image => &IMAGE,
        }
    }

    pub fn shape(self) -> BlockShape {
        self.metadata().shape
    }

    pub fn is_void(self) -> bool {
        matches!(self, BlockId::Void)
    }

    pub fn is_transparent(self) -> bool {
        self.metadata().transparent
    }

    pub fn is_intangible(self) -> bool {
        self.metadata().intangible
    }

    pub fn is_fluid(self) -> bool {
        matches!(self.shape(), BlockShape::Fluid)
    }

    /// Flat blocks are meaningless without a facing
    pub fn requires_orientation(self) -> bool {
        matches!(self.shape(), BlockShape::Flat)
    }
}

impl From<BlockId> for u8 {
    fn from(id: BlockId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for BlockId {
    type Error = EngineError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        BlockId::ALL
            .get(id as usize)
            .copied()
            .ok_or(EngineError::InvalidBlockType { id: id as u32 })
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata().name)
    }
}

/// Per-block auxiliary data kept outside the dense array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockExtra {
    /// Picture frame decal
    Image { face: Direction, gallery_index: u32 },
}

impl BlockExtra {
    pub fn orientation(&self) -> Option<Direction> {
        match self {
            BlockExtra::Image { face, .. } => Some(*face),
        }
    }
}

/// A resolved block: type, world position and optional extras
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub block_type: BlockId,
    pub pos: WorldPos,
    pub extra: Option<BlockExtra>,
}

impl Block {
    pub fn new(block_type: BlockId, pos: WorldPos) -> Self {
        Self {
            block_type,
            pos,
            extra: None,
        }
    }

    pub fn with_extra(block_type: BlockId, pos: WorldPos, extra: BlockExtra) -> Self {
        Self {
            block_type,
            pos,
            extra: Some(extra),
        }
    }

    pub fn shape(&self) -> BlockShape {
        self.block_type.shape()
    }

    pub fn orientation(&self) -> Option<Direction> {
        self.extra.as_ref().and_then(BlockExtra::orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids_are_stable() {
        for (index, id) in BlockId::ALL.iter().enumerate() {
            assert_eq!(u8::from(*id) as usize, index);
            assert_eq!(BlockId::try_from(index as u8).ok(), Some(*id));
        }
        assert!(BlockId::try_from(10).is_err());
    }

    #[test]
    fn test_metadata_table() {
        assert!(BlockId::Void.is_intangible());
        assert!(BlockId::Leaf.is_transparent());
        assert!(!BlockId::Leaf.is_intangible());
        assert_eq!(BlockId::RedFlower.shape(), BlockShape::XCross);
        assert!(BlockId::Water.is_fluid());
        assert!(BlockId::Water.is_intangible());
        assert!(BlockId::Image.requires_orientation());
        assert!(!BlockId::Stone.is_transparent());
    }

    #[test]
    fn test_serde_uses_wire_id() {
        let json = serde_json::to_string(&BlockId::Grass).unwrap();
        assert_eq!(json, "8");
        let parsed: BlockId = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, BlockId::Gold);
        assert!(serde_json::from_str::<BlockId>("200").is_err());
    }

    #[test]
    fn test_orientation_from_extra() {
        let block = Block::with_extra(
            BlockId::Image,
            WorldPos::new(0, 0, 0),
            BlockExtra::Image {
                face: Direction::NegX,
                gallery_index: 3,
            },
        );
        assert_eq!(block.orientation(), Some(Direction::NegX));
        assert_eq!(Block::new(BlockId::Stone, WorldPos::default()).orientation(), None);
    }
}
