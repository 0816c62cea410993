//! Fixed-cadence simulation tick.
//!
//! The tick loop is the only writer of bodies and chunk contents; readers
//! run between ticks.

use std::time::{Duration, Instant};

use super::body_data::BodyData;
use super::body_operations;
use crate::world::management::World;
use crate::PhysicsConfig;

/// Velocities are expressed per this many milliseconds
const VELOCITY_UNIT_MS: f32 = 16.0;

/// Displacement scale for a tick that took `delta_ms`. Deltas beyond the
/// limit (a suspended process, a debugger) move nothing.
pub fn displacement_scale(delta_ms: f32, max_delta_ms: f32) -> f32 {
    if delta_ms > max_delta_ms {
        0.0
    } else {
        delta_ms / VELOCITY_UNIT_MS
    }
}

#[derive(Debug, Clone)]
pub struct TickClock {
    interval: Duration,
    max_delta_ms: f32,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl TickClock {
    pub fn new(physics: &PhysicsConfig) -> Self {
        Self {
            interval: Duration::from_millis(physics.tick_ms),
            max_delta_ms: physics.max_delta_ms as f32,
            last_tick: None,
            ticks: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether a tick is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_tick {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Time left until the next tick
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Start a tick at `now` and return its displacement scale. The first
    /// tick is treated as exactly one interval long.
    pub fn begin_tick(&mut self, now: Instant) -> f32 {
        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last),
            None => self.interval,
        };
        self.last_tick = Some(now);
        self.ticks += 1;

        let delta_ms = delta.as_micros() as f32 / 1000.0;
        let scale = displacement_scale(delta_ms, self.max_delta_ms);
        if scale == 0.0 {
            log::warn!(
                "[TickClock::begin_tick] Tick {} took {:.0}ms, suppressing displacement",
                self.ticks,
                delta_ms
            );
        }
        scale
    }
}

/// One simulation step: install finished chunk loads, then move bodies
pub fn run_tick(world: &mut World, bodies: &mut [BodyData], physics: &PhysicsConfig, scale: f32) {
    let installed = world.pump_loads();
    if installed > 0 {
        log::debug!("[tick::run_tick] Installed {} chunks", installed);
    }
    body_operations::step_bodies(bodies, world, physics, scale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockId, ChunkPos, WorldPos};
    use crate::world::storage::Chunk;
    use crate::EngineConfig;
    use cgmath::{Point3, Vector3};

    #[test]
    fn test_displacement_scale() {
        assert_eq!(displacement_scale(16.0, 100.0), 1.0);
        assert_eq!(displacement_scale(25.0, 100.0), 25.0 / 16.0);
        assert_eq!(displacement_scale(100.0, 100.0), 100.0 / 16.0);
        assert_eq!(displacement_scale(250.0, 100.0), 0.0);
    }

    #[test]
    fn test_clock_cadence() {
        let physics = PhysicsConfig::default();
        let mut clock = TickClock::new(&physics);
        let start = Instant::now();
        assert!(clock.is_due(start));

        let scale = clock.begin_tick(start);
        assert_eq!(scale, 25.0 / 16.0);
        assert!(!clock.is_due(start + Duration::from_millis(10)));
        assert_eq!(clock.until_next(start + Duration::from_millis(10)), Duration::from_millis(15));
        assert!(clock.is_due(start + Duration::from_millis(25)));

        let scale = clock.begin_tick(start + Duration::from_millis(500));
        assert_eq!(scale, 0.0);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_run_tick_moves_bodies() {
        let config = EngineConfig::default();
        let mut world = World::new(&config).unwrap();
        world.insert_chunk(Chunk::new(ChunkPos::new(0, 0), world.geometry()));
        world.set_block(WorldPos::new(1, 0, 1), BlockId::Stone, None).unwrap();

        let mut bodies = [body_operations::create_body(
            Point3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
        )];
        run_tick(&mut world, &mut bodies, &config.physics, 1.0);
        assert_eq!(bodies[0].position.y, 1.0);
        assert!(bodies[0].on_ground);
    }
}
