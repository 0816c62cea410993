//! World management - chunk registry, asynchronous loading and change
//! tracking.

pub mod diff;
pub mod loader;
pub mod world;

pub use diff::ChunkDiff;
pub use loader::{ChunkDelivery, ChunkReader, LoadPolicy, LoadRequest};
pub use world::World;
