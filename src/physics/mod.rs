//! Physics Module - axis-aligned bodies against unit blocks
//!
//! - aabb.rs: box overlap and push-out
//! - body_data.rs: pure body data
//! - body_operations.rs: integration and collision resolution
//! - tick.rs: fixed-cadence stepping

pub mod aabb;
pub mod body_data;
pub mod body_operations;
pub mod tick;

pub use aabb::{FaceHit, HitSide, AABB};
pub use body_data::BodyData;
pub use tick::{run_tick, TickClock};

// Re-export DOP operations
pub use body_operations::{
    body_aabb, create_body, resolve_body_collisions, resolve_world_collisions, step_bodies,
};
