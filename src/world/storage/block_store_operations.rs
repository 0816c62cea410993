//! Block Store Operations - Pure DOP Functions
//!
//! All functions take the store data explicitly. Local coordinates outside
//! the chunk are rejected, never wrapped into a neighbouring cell.

use rustc_hash::FxHashMap;

use super::block_store_data::BlockStoreData;
use crate::world::core::{BlockExtra, BlockId, ChunkGeometry, LocalPos};
use crate::world::error::{WorldError, WorldResult};

/// Create an empty store (all cells void)
pub fn create_block_store(geometry: ChunkGeometry) -> BlockStoreData {
    BlockStoreData {
        geometry,
        blocks: vec![BlockId::Void; geometry.volume()],
        extras: FxHashMap::default(),
        occupied: 0,
    }
}

/// Create a store from a dense array and its extras, validating both
pub fn create_with_blocks(
    geometry: ChunkGeometry,
    blocks: Vec<BlockId>,
    extras: FxHashMap<usize, BlockExtra>,
) -> WorldResult<BlockStoreData> {
    if blocks.len() != geometry.volume() {
        return Err(WorldError::MalformedChunk(format!(
            "expected {} blocks, found {}",
            geometry.volume(),
            blocks.len()
        )));
    }

    for (index, extra) in &extras {
        let id = blocks
            .get(*index)
            .copied()
            .ok_or(WorldError::IndexOutOfBounds {
                index: *index,
                volume: geometry.volume(),
            })?;
        if id.is_void() {
            return Err(WorldError::MalformedChunk(format!(
                "extra data {:?} stored on void cell {}",
                extra, index
            )));
        }
    }

    for (index, id) in blocks.iter().enumerate() {
        let oriented = extras.get(&index).and_then(BlockExtra::orientation).is_some();
        if id.requires_orientation() && !oriented {
            return Err(WorldError::MissingOrientation { block: *id });
        }
    }

    let occupied = blocks.iter().filter(|id| !id.is_void()).count();
    Ok(BlockStoreData {
        geometry,
        blocks,
        extras,
        occupied,
    })
}

/// Block type at a local position (`Void` when empty)
pub fn get_block(data: &BlockStoreData, local: LocalPos) -> WorldResult<BlockId> {
    let index = data.geometry.pack(local)?;
    Ok(data.blocks[index])
}

/// Extra data at a local position
pub fn get_extra(data: &BlockStoreData, local: LocalPos) -> WorldResult<Option<BlockExtra>> {
    let index = data.geometry.pack(local)?;
    Ok(data.extras.get(&index).copied())
}

pub fn has_block(data: &BlockStoreData, local: LocalPos) -> WorldResult<bool> {
    Ok(!get_block(data, local)?.is_void())
}

/// Write a cell. Setting `Void` clears the cell together with its extras.
///
/// Returns the previous block type.
pub fn set_block(
    data: &mut BlockStoreData,
    local: LocalPos,
    id: BlockId,
    extra: Option<BlockExtra>,
) -> WorldResult<BlockId> {
    let index = data.geometry.pack(local)?;

    if id.requires_orientation() && extra.and_then(|e| e.orientation()).is_none() {
        return Err(WorldError::MissingOrientation { block: id });
    }

    let previous = data.blocks[index];
    data.blocks[index] = id;

    match (previous.is_void(), id.is_void()) {
        (true, false) => data.occupied += 1,
        (false, true) => data.occupied -= 1,
        _ => {}
    }

    match extra {
        Some(extra) if !id.is_void() => {
            data.extras.insert(index, extra);
        }
        _ => {
            data.extras.remove(&index);
        }
    }

    Ok(previous)
}

/// Clear a cell, returning what was there
pub fn remove_block(
    data: &mut BlockStoreData,
    local: LocalPos,
) -> WorldResult<Option<(BlockId, Option<BlockExtra>)>> {
    let index = data.geometry.pack(local)?;
    let previous = data.blocks[index];
    if previous.is_void() {
        return Ok(None);
    }
    let extra = data.extras.remove(&index);
    data.blocks[index] = BlockId::Void;
    data.occupied -= 1;
    Ok(Some((previous, extra)))
}

/// Occupied cells in canonical index order
pub fn occupied_blocks(
    data: &BlockStoreData,
) -> impl Iterator<Item = (LocalPos, BlockId, Option<BlockExtra>)> + '_ {
    data.blocks
        .iter()
        .enumerate()
        .filter(|(_, id)| !id.is_void())
        .filter_map(move |(index, id)| {
            let local = data.geometry.unpack(index).ok()?;
            Some((local, *id, data.extras.get(&index).copied()))
        })
}

pub fn occupied_count(data: &BlockStoreData) -> usize {
    data.occupied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::Direction;

    fn store() -> BlockStoreData {
        create_block_store(ChunkGeometry::new(16, 64).unwrap())
    }

    fn image(face: Direction) -> BlockExtra {
        BlockExtra::Image {
            face,
            gallery_index: 0,
        }
    }

    #[test]
    fn test_set_get_remove() {
        let mut data = store();
        let local = LocalPos::new(3, 10, 7);
        assert!(!has_block(&data, local).unwrap());

        let previous = set_block(&mut data, local, BlockId::Stone, None).unwrap();
        assert_eq!(previous, BlockId::Void);
        assert_eq!(get_block(&data, local).unwrap(), BlockId::Stone);
        assert_eq!(occupied_count(&data), 1);

        let removed = remove_block(&mut data, local).unwrap();
        assert_eq!(removed, Some((BlockId::Stone, None)));
        assert_eq!(occupied_count(&data), 0);
        assert_eq!(remove_block(&mut data, local).unwrap(), None);
    }

    #[test]
    fn test_void_clears_extras() {
        let mut data = store();
        let local = LocalPos::new(0, 0, 0);
        set_block(&mut data, local, BlockId::Image, Some(image(Direction::PosZ))).unwrap();
        assert_eq!(get_extra(&data, local).unwrap(), Some(image(Direction::PosZ)));

        set_block(&mut data, local, BlockId::Void, Some(image(Direction::PosZ))).unwrap();
        assert!(data.extras.is_empty());
        assert_eq!(occupied_count(&data), 0);
    }

    #[test]
    fn test_overwrite_drops_stale_extra() {
        let mut data = store();
        let local = LocalPos::new(1, 1, 1);
        set_block(&mut data, local, BlockId::Image, Some(image(Direction::NegX))).unwrap();
        set_block(&mut data, local, BlockId::Stone, None).unwrap();
        assert_eq!(get_extra(&data, local).unwrap(), None);
        assert_eq!(occupied_count(&data), 1);
    }

    #[test]
    fn test_flat_block_requires_orientation() {
        let mut data = store();
        let result = set_block(&mut data, LocalPos::new(0, 0, 0), BlockId::Image, None);
        assert_eq!(
            result,
            Err(WorldError::MissingOrientation {
                block: BlockId::Image
            })
        );
        assert_eq!(occupied_count(&data), 0);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut data = store();
        assert!(get_block(&data, LocalPos::new(16, 0, 0)).is_err());
        assert!(set_block(&mut data, LocalPos::new(0, 64, 0), BlockId::Stone, None).is_err());
        assert_eq!(occupied_count(&data), 0);
    }

    #[test]
    fn test_occupied_blocks_in_index_order() {
        let mut data = store();
        set_block(&mut data, LocalPos::new(2, 0, 0), BlockId::Wood, None).unwrap();
        set_block(&mut data, LocalPos::new(0, 0, 5), BlockId::Gold, None).unwrap();
        let cells: Vec<_> = occupied_blocks(&data).collect();
        assert_eq!(
            cells,
            vec![
                (LocalPos::new(0, 0, 5), BlockId::Gold, None),
                (LocalPos::new(2, 0, 0), BlockId::Wood, None),
            ]
        );
    }

    #[test]
    fn test_create_with_blocks_validates() {
        let geometry = ChunkGeometry::new(16, 64).unwrap();
        assert!(create_with_blocks(geometry, vec![BlockId::Void; 10], FxHashMap::default()).is_err());

        let mut extras = FxHashMap::default();
        extras.insert(0, image(Direction::PosX));
        assert!(create_with_blocks(geometry, vec![BlockId::Void; geometry.volume()], extras).is_err());

        let mut blocks = vec![BlockId::Void; geometry.volume()];
        blocks[5] = BlockId::Image;
        assert!(create_with_blocks(geometry, blocks.clone(), FxHashMap::default()).is_err());

        let mut extras = FxHashMap::default();
        extras.insert(5, image(Direction::PosX));
        let data = create_with_blocks(geometry, blocks, extras).unwrap();
        assert_eq!(occupied_count(&data), 1);
    }
}
