//! Engine-wide constants
//!
//! Defaults for configurable values live here too; `EngineConfig::default`
//! reads them so tests and config files agree.

pub mod core {
    /// Blocks along x and z of a chunk
    pub const CHUNK_WIDTH: u32 = 16;

    /// Blocks along y; the world has no vertical chunking
    pub const WORLD_HEIGHT: u32 = 64;

    /// Largest accepted chunk width or world height
    pub const MAX_DIMENSION: u32 = 256;
}

pub mod terrain {
    pub const JAG_FACTOR: f64 = 32.0;
    pub const CLOUD_LEVEL: i32 = 30;
    pub const WATER_LEVEL: i32 = -1;

    /// Frequency divisor for cloud thickness noise
    pub const CLOUD_JAG_FACTOR: f64 = 4.0;
    pub const CLOUD_MAX_THICKNESS: f64 = 4.0;

    pub const TRUNK_HEIGHT: i32 = 5;

    /// Chunks scanned in each direction when decorating around a new chunk
    pub const DECORATION_RADIUS: i32 = 2;

    // Probabilities are thresholds on a uniform draw in [0, 1)
    pub const GOLD_THRESHOLD: f32 = 0.9;
    pub const FLOWER_THRESHOLD: f32 = 0.99;
    pub const FOREST_TREE_THRESHOLD: f32 = 0.95;
    pub const PLAINS_TREE_THRESHOLD: f32 = 0.999;
    pub const CLOUD_THRESHOLD: f32 = 0.999;
}

pub mod biome {
    /// Edge length of a macro section, also the minimum seed separation
    pub const SECTION_SIZE: f32 = 30.0;
    pub const SAMPLE_ATTEMPTS: usize = 3;
    pub const EASE_DISTANCE: f32 = 5.0;
}

pub mod physics {
    pub const GRAVITY: f32 = -0.013;
    pub const TERMINAL_SPEED: f32 = 0.9;
    pub const TICK_MS: u64 = 25;

    /// Longer ticks suppress displacement instead of catching up
    pub const MAX_DELTA_MS: u64 = 100;
}

pub mod player {
    pub const REACH: f32 = 10.0;
    pub const LOAD_DISTANCE: i32 = 2;
}
