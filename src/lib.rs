// Craft World - chunked blocky world engine
//
// Data-oriented where the data is plain (camera, bodies, block stores):
// - *_data.rs files hold data with no methods
// - *_operations.rs files hold pure functions over that data
// The world registry and generator keep their state behind methods.

// Constants module
pub mod constants;

pub mod error;

// Essential systems
pub mod camera;
pub mod physics;
pub mod world;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use camera::CameraData;
pub use error::{EngineError, EngineResult, ErrorContext, OptionExt};
pub use physics::{BodyData, TickClock, AABB};
pub use world::core::{Block, BlockId, ChunkGeometry, ChunkPos, LocalPos, SphericalRotation, WorldPos};
pub use world::generation::{GeneratorChunkReader, TerrainGenerator};
pub use world::management::{ChunkReader, World};
pub use world::picking::LookingAt;

use constants::{physics as physics_defaults, player, terrain};

/// Terrain generation switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Every column is a single grass block at y = 0
    pub flat_world: bool,
    pub trees: bool,
    pub flowers: bool,
    pub clouds: bool,
    /// Horizontal frequency divisor of the terrain noise
    pub jag_factor: f64,
    pub cloud_level: i32,
    pub water_level: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            flat_world: false,
            trees: true,
            flowers: true,
            clouds: true,
            jag_factor: terrain::JAG_FACTOR,
            cloud_level: terrain::CLOUD_LEVEL,
            water_level: terrain::WATER_LEVEL,
        }
    }
}

/// Body simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Velocity change per tick while airborne
    pub gravity: f32,
    pub terminal_speed: f32,
    pub tick_ms: u64,
    pub max_delta_ms: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: physics_defaults::GRAVITY,
            terminal_speed: physics_defaults::TERMINAL_SPEED,
            tick_ms: physics_defaults::TICK_MS,
            max_delta_ms: physics_defaults::MAX_DELTA_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub reach: f32,
    /// Chunks loaded in each direction around the player
    pub load_distance: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            reach: player::REACH,
            load_distance: player::LOAD_DISTANCE,
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    pub chunk_width: u32,
    pub world_height: u32,
    /// Treat faces against unloaded chunks as hidden
    pub occlude_unloaded: bool,
    pub terrain: TerrainConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_width: constants::core::CHUNK_WIDTH,
            world_height: constants::core::WORLD_HEIGHT,
            occlude_unloaded: false,
            terrain: TerrainConfig::default(),
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [("chunk_width", self.chunk_width), ("world_height", self.world_height)] {
            if !value.is_power_of_two() {
                return Err(anyhow::anyhow!(
                    "EngineConfig: {} {} is not a power of two",
                    name,
                    value
                ));
            }
            if value > constants::core::MAX_DIMENSION {
                return Err(anyhow::anyhow!(
                    "EngineConfig: {} {} exceeds maximum of {}",
                    name,
                    value,
                    constants::core::MAX_DIMENSION
                ));
            }
        }

        let height = self.world_height as i32;
        if self.terrain.clouds && !(0..height).contains(&self.terrain.cloud_level) {
            return Err(anyhow::anyhow!(
                "EngineConfig: cloud_level {} outside world height {}",
                self.terrain.cloud_level,
                height
            ));
        }
        if self.terrain.water_level >= height {
            return Err(anyhow::anyhow!(
                "EngineConfig: water_level {} must be below world height {}",
                self.terrain.water_level,
                height
            ));
        }
        if self.terrain.jag_factor <= 0.0 {
            return Err(anyhow::anyhow!("EngineConfig: jag_factor must be positive"));
        }

        if self.player.reach <= 0.0 {
            return Err(anyhow::anyhow!("EngineConfig: reach must be positive"));
        }
        if self.player.load_distance < 0 {
            return Err(anyhow::anyhow!("EngineConfig: load_distance cannot be negative"));
        }

        if self.physics.tick_ms == 0 {
            return Err(anyhow::anyhow!("EngineConfig: tick_ms cannot be 0"));
        }
        if self.physics.max_delta_ms < self.physics.tick_ms {
            return Err(anyhow::anyhow!(
                "EngineConfig: max_delta_ms {} is shorter than one tick ({} ms)",
                self.physics.max_delta_ms,
                self.physics.tick_ms
            ));
        }

        log::info!(
            "[EngineConfig] Validation: chunk={}x{}x{}, volume={}, seed={}",
            self.chunk_width,
            self.world_height,
            self.chunk_width,
            self.chunk_width as u64 * self.chunk_width as u64 * self.world_height as u64,
            self.seed
        );
        log::info!("[EngineConfig] Configuration validated successfully");
        Ok(())
    }

    /// Chunk dimensions as packing geometry
    pub fn geometry(&self) -> EngineResult<ChunkGeometry> {
        if self.chunk_width > constants::core::MAX_DIMENSION || self.world_height > constants::core::MAX_DIMENSION {
            return Err(EngineError::InvalidConfig {
                field: "chunk_width/world_height".to_string(),
                value: format!("{}x{}", self.chunk_width, self.world_height),
                reason: format!("exceeds maximum of {}", constants::core::MAX_DIMENSION),
            });
        }
        Ok(ChunkGeometry::new(self.chunk_width, self.world_height)?)
    }

    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::SerializationError {
            context: "engine config".to_string(),
            error: e.to_string(),
        })
    }

    /// Read, parse and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("[EngineConfig::load] Loaded {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_default_config_is_valid() {
        init_logging();
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        let geometry = config.geometry().unwrap();
        assert_eq!(geometry.width(), 16);
        assert_eq!(geometry.height(), 64);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = EngineConfig {
            chunk_width: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.geometry().is_err());
    }

    #[test]
    fn test_rejects_oversized_chunks() {
        let config = EngineConfig {
            world_height: 512,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(config.geometry(), Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_rejects_cloud_level_above_world() {
        let mut config = EngineConfig::default();
        config.terrain.cloud_level = 64;
        assert!(config.validate().is_err());
        config.terrain.clouds = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            "seed = 7\n\n[terrain]\nflat_world = true\n\n[player]\nreach = 4.5\n",
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.terrain.flat_world);
        assert!(config.terrain.trees);
        assert_eq!(config.player.reach, 4.5);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.seed = 99;
        config.occlude_unloaded = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        init_logging();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 3\nchunk_width = 8\nworld_height = 32").unwrap();
        writeln!(file, "[terrain]\ncloud_level = 20").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.chunk_width, 8);
        assert_eq!(config.terrain.cloud_level, 20);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_width = 10").unwrap();
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(EngineError::Internal { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }
}
