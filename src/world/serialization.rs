//! Wire forms of chunks and blocks.
//!
//! Field names follow the camelCase contract shared with the network and
//! persistence layers. Binary payloads are bincode with a CRC-32 trailer.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::core::{Block, BlockExtra, BlockId, ChunkGeometry, ChunkPos, WorldPos};
use super::error::{WorldError, WorldErrorContext};
use super::storage::{block_store_operations as store_ops, Chunk};
use crate::error::{EngineError, EngineResult};

/// Chunk coordinate on the wire; `y` carries the world z axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl From<ChunkPos> for ChunkCoord {
    fn from(pos: ChunkPos) -> Self {
        Self { x: pos.x, y: pos.z }
    }
}

impl From<ChunkCoord> for ChunkPos {
    fn from(coord: ChunkCoord) -> Self {
        ChunkPos::new(coord.x, coord.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedChunk {
    pub chunk_coord: ChunkCoord,
    /// Block ids in canonical index order
    pub blocks: Vec<u8>,
    pub block_extras: BTreeMap<String, BlockExtra>,
    pub chunk_id: String,
}

impl SerializedChunk {
    pub fn position(&self) -> ChunkPos {
        self.chunk_coord.into()
    }
}

/// Single block placement message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedBlock {
    #[serde(rename = "type")]
    pub block_type: BlockId,
    pub world_pos: WorldPos,
    #[serde(default)]
    pub extra_data: Option<BlockExtra>,
}

impl From<Block> for SerializedBlock {
    fn from(block: Block) -> Self {
        Self {
            block_type: block.block_type,
            world_pos: block.pos,
            extra_data: block.extra,
        }
    }
}

impl From<SerializedBlock> for Block {
    fn from(block: SerializedBlock) -> Self {
        Block {
            block_type: block.block_type,
            pos: block.world_pos,
            extra: block.extra_data,
        }
    }
}

impl Chunk {
    pub fn serialize(&self) -> SerializedChunk {
        let store = self.store();
        let blocks: &[u8] = bytemuck::cast_slice(store.blocks.as_slice());
        let block_extras = store
            .extras
            .iter()
            .map(|(index, extra)| (index.to_string(), *extra))
            .collect();

        SerializedChunk {
            chunk_coord: self.position().into(),
            blocks: blocks.to_vec(),
            block_extras,
            chunk_id: self.id(),
        }
    }

    /// Rebuild a chunk, rejecting payloads that do not fit `geometry`
    pub fn deserialize(serialized: &SerializedChunk, geometry: ChunkGeometry) -> EngineResult<Chunk> {
        let position = serialized.position();
        if serialized.chunk_id != position.key() {
            return Err(WorldError::MalformedChunk(format!(
                "chunk id '{}' does not match coordinate {}",
                serialized.chunk_id, position
            ))
            .into());
        }

        let blocks: &[BlockId] = bytemuck::checked::try_cast_slice(serialized.blocks.as_slice())
            .map_err(|_| {
                let id = serialized
                    .blocks
                    .iter()
                    .copied()
                    .find(|raw| BlockId::try_from(*raw).is_err())
                    .unwrap_or_default();
                EngineError::InvalidBlockType { id: id as u32 }
            })?;

        let mut extras = FxHashMap::default();
        for (key, extra) in &serialized.block_extras {
            let index = key.parse::<usize>().world_context("block extra key")?;
            extras.insert(index, *extra);
        }

        let store = store_ops::create_with_blocks(geometry, blocks.to_vec(), extras)?;
        Ok(Chunk::with_store(position, store))
    }
}

/// Encode a chunk as bincode followed by a little-endian CRC-32 of the body
pub fn encode_chunk_payload(chunk: &SerializedChunk) -> EngineResult<Vec<u8>> {
    let mut payload = bincode::serialize(chunk).map_err(|e| EngineError::SerializationError {
        context: format!("chunk {}", chunk.chunk_id),
        error: e.to_string(),
    })?;
    let checksum = crc32fast::hash(&payload);
    payload.extend_from_slice(&checksum.to_le_bytes());
    Ok(payload)
}

pub fn decode_chunk_payload(payload: &[u8]) -> EngineResult<SerializedChunk> {
    if payload.len() < 4 {
        return Err(EngineError::CorruptedData {
            reason: format!("chunk payload of {} bytes has no checksum", payload.len()),
        });
    }
    let (body, trailer) = payload.split_at(payload.len() - 4);
    let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(EngineError::CorruptedData {
            reason: format!("checksum mismatch: expected {:08x}, found {:08x}", expected, actual),
        });
    }
    Ok(bincode::deserialize(body)?)
}

pub fn to_json<T: Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string(value).map_err(|e| EngineError::SerializationError {
        context: "json".to_string(),
        error: e.to_string(),
    })
}

pub fn from_json<T: DeserializeOwned>(json: &str) -> EngineResult<T> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::Direction;

    fn geometry() -> ChunkGeometry {
        ChunkGeometry::new(16, 64).unwrap()
    }

    fn sample_chunk() -> Chunk {
        let mut chunk = Chunk::new(ChunkPos::new(-1, 2), geometry());
        chunk.set(WorldPos::new(-16, 0, 32), BlockId::Stone, None).unwrap();
        chunk.set(WorldPos::new(-1, 63, 47), BlockId::Leaf, None).unwrap();
        chunk
            .set(
                WorldPos::new(-5, 3, 40),
                BlockId::Image,
                Some(BlockExtra::Image {
                    face: Direction::NegZ,
                    gallery_index: 7,
                }),
            )
            .unwrap();
        chunk
    }

    #[test]
    fn test_chunk_round_trip() {
        let chunk = sample_chunk();
        let serialized = chunk.serialize();
        assert_eq!(serialized.chunk_id, "-1,2");
        assert_eq!(serialized.chunk_coord, ChunkCoord { x: -1, y: 2 });
        assert_eq!(serialized.blocks.len(), geometry().volume());

        let restored = Chunk::deserialize(&serialized, geometry()).unwrap();
        assert_eq!(restored.store(), chunk.store());
        assert_eq!(restored.position(), chunk.position());
    }

    #[test]
    fn test_json_field_names() {
        let json = to_json(&sample_chunk().serialize()).unwrap();
        assert!(json.contains("\"chunkCoord\":{\"x\":-1,\"y\":2}"));
        assert!(json.contains("\"blockExtras\""));
        assert!(json.contains("\"chunkId\":\"-1,2\""));

        let block = SerializedBlock::from(Block::new(BlockId::Wood, WorldPos::new(1, 2, 3)));
        let json = to_json(&block).unwrap();
        assert_eq!(
            json,
            "{\"type\":2,\"worldPos\":{\"x\":1,\"y\":2,\"z\":3},\"extraData\":null}"
        );
        let parsed: SerializedBlock = from_json(&json).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn test_truncated_chunk_rejected() {
        let mut serialized = sample_chunk().serialize();
        serialized.blocks.truncate(100);
        assert!(matches!(
            Chunk::deserialize(&serialized, geometry()),
            Err(EngineError::World(WorldError::MalformedChunk(_)))
        ));
    }

    #[test]
    fn test_unknown_block_id_rejected() {
        let mut serialized = sample_chunk().serialize();
        serialized.blocks[3] = 99;
        assert!(matches!(
            Chunk::deserialize(&serialized, geometry()),
            Err(EngineError::InvalidBlockType { id: 99 })
        ));
    }

    #[test]
    fn test_mismatched_id_rejected() {
        let mut serialized = sample_chunk().serialize();
        serialized.chunk_id = "0,0".to_string();
        assert!(Chunk::deserialize(&serialized, geometry()).is_err());
    }

    #[test]
    fn test_binary_payload() {
        let serialized = sample_chunk().serialize();
        let payload = encode_chunk_payload(&serialized).unwrap();
        assert_eq!(decode_chunk_payload(&payload).unwrap(), serialized);

        let mut corrupted = payload.clone();
        corrupted[10] ^= 0xff;
        assert!(matches!(
            decode_chunk_payload(&corrupted),
            Err(EngineError::CorruptedData { .. })
        ));
        assert!(decode_chunk_payload(&payload[..2]).is_err());
    }
}
