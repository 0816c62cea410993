//! Seeded noise and randomness shared by every generation call.
//!
//! Built once per world and passed by reference; nothing here is global, so
//! two worlds with different seeds can generate side by side.

use noise::{NoiseFn, OpenSimplex};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Salts separating the random streams of different generation stages
pub mod salt {
    pub const BIOME_SECTION: u64 = 0x6269_6f6d_6573;
    pub const COLUMN: u64 = 0x636f_6c75_6d6e;
    pub const DECORATION: u64 = 0x6465_636f_72;
}

/// Finalizer from splitmix64
fn mix(mut h: u64) -> u64 {
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

pub struct GenerationContext {
    seed: u64,
    jag_factor: f64,
    terrain_noise: OpenSimplex,
    cloud_noise: OpenSimplex,
}

impl GenerationContext {
    pub fn new(seed: u64, jag_factor: f64) -> Self {
        let noise_seed = (seed ^ (seed >> 32)) as u32;
        Self {
            seed,
            jag_factor,
            terrain_noise: OpenSimplex::new(noise_seed),
            cloud_noise: OpenSimplex::new(noise_seed.wrapping_add(1)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Terrain noise at a column, mapped into `[0, 1]`
    pub fn noise01(&self, x: f64, z: f64) -> f64 {
        let n = self.terrain_noise.get([x / self.jag_factor, z / self.jag_factor]);
        ((n + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Cloud noise with its own frequency, mapped into `[0, 1]`
    pub fn cloud_noise01(&self, x: f64, z: f64, jag_factor: f64) -> f64 {
        let n = self.cloud_noise.get([x / jag_factor, z / jag_factor]);
        ((n + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Deterministic random stream for one stage at one coordinate
    pub fn rng_for(&self, salt: u64, x: i32, z: i32) -> StdRng {
        let mut h = mix(self.seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        h = mix(h ^ x as u32 as u64);
        h = mix(h ^ ((z as u32 as u64) << 32));
        StdRng::seed_from_u64(h)
    }
}
