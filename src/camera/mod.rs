/// Camera Module - Data-Oriented Programming (DOP) style
///
/// - camera_data.rs: Pure data structures with NO methods
/// - camera_operations.rs: Pure functions that operate on data

pub mod camera_data;
pub mod camera_operations;

pub use camera_data::CameraData;

pub use camera_operations::{
    // Initialization
    init_camera,
    init_camera_with_spawn,

    // Movement
    move_forward,
    move_right,
    move_up,
    rotate,

    // Picking
    camera_ray_vector,
    looking_at,

    // Utilities
    calculate_forward_vector,
    calculate_right_vector,

    // Diagnostics
    camera_block_position,
    camera_chunk_position,
    chunks_in_load_distance,
    log_camera_context,
};
