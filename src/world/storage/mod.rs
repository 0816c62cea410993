//! Chunk storage
//!
//! - block_store_data.rs: dense block array plus sparse extras, no methods
//! - block_store_operations.rs: pure functions over the store
//! - chunk.rs: a store placed at a chunk coordinate, addressed in world space

mod block_store_data;
pub mod block_store_operations;
mod chunk;

pub use block_store_data::BlockStoreData;
pub use chunk::{Chunk, VisibleBlock};
