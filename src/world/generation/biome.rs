//! Biome assignment over a lazily resolved macro grid.
//!
//! World space is cut into square sections of `SECTION_SIZE` blocks. A
//! section resolves to either a seed point with a biome or to nothing, and
//! the outcome depends only on the section coordinate and the world seed.
//! Each section draws a fixed list of candidate points from its own stream;
//! it keeps the first one that clears every candidate of the neighbours
//! ranked before it. Any two neighbouring seeds therefore stay at least
//! `SECTION_SIZE` apart whatever order sections are asked for in.

use cgmath::{MetricSpace, Vector2};
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::context::{salt, GenerationContext};
use crate::constants::biome::{EASE_DISTANCE, SAMPLE_ATTEMPTS, SECTION_SIZE};
use crate::world::core::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Mountain,
    Forest,
}

impl Biome {
    pub const ALL: [Biome; 3] = [Biome::Plains, Biome::Mountain, Biome::Forest];

    pub fn max_height(self) -> f32 {
        match self {
            Biome::Plains => 4.0,
            Biome::Mountain => 20.0,
            Biome::Forest => 10.0,
        }
    }

    /// Block capping a terrain column
    pub fn top_block(self) -> BlockId {
        match self {
            Biome::Plains => BlockId::Grass,
            Biome::Mountain => BlockId::Stone,
            Biome::Forest => BlockId::Wood,
        }
    }
}

/// Macro-section coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectionPos {
    pub x: i32,
    pub z: i32,
}

impl SectionPos {
    pub const ORIGIN: SectionPos = SectionPos::new(0, 0);

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Fixed ranking among neighbours: the origin first, then by x, then z
    fn precedes(self, other: SectionPos) -> bool {
        let rank = |pos: SectionPos| (pos != SectionPos::ORIGIN, pos.x, pos.z);
        rank(self) < rank(other)
    }

    pub fn containing(point: Vector2<f32>) -> Self {
        Self::new(
            (point.x / SECTION_SIZE).floor() as i32,
            (point.y / SECTION_SIZE).floor() as i32,
        )
    }

    /// The 3x3 block of sections centred here, row by row
    pub fn neighborhood(self) -> [SectionPos; 9] {
        let mut out = [self; 9];
        let mut i = 0;
        for dz in -1..=1 {
            for dx in -1..=1 {
                out[i] = SectionPos::new(self.x + dx, self.z + dz);
                i += 1;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeSeed {
    pub biome: Biome,
    pub section: SectionPos,
    /// World-space xz point the biome radiates from
    pub seed_pos: Vector2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MacroSection {
    Unresolved,
    Empty,
    Seeded(BiomeSeed),
}

pub struct BiomeGenerator {
    sections: FxHashMap<SectionPos, MacroSection>,
}

/// Candidate seed points of a section and the biome it would take.
/// The origin section has the world origin as its only candidate.
fn section_draws(pos: SectionPos, context: &GenerationContext) -> (Vec<Vector2<f32>>, Biome) {
    let mut rng = context.rng_for(salt::BIOME_SECTION, pos.x, pos.z);
    if pos == SectionPos::ORIGIN {
        let biome = Biome::ALL[rng.gen_range(0..Biome::ALL.len())];
        return (vec![Vector2::new(0.0, 0.0)], biome);
    }

    let corner = Vector2::new(pos.x as f32 * SECTION_SIZE, pos.z as f32 * SECTION_SIZE);
    let candidates: Vec<Vector2<f32>> = (0..SAMPLE_ATTEMPTS)
        .map(|_| {
            corner
                + Vector2::new(
                    rng.gen_range(0.0..SECTION_SIZE),
                    rng.gen_range(0.0..SECTION_SIZE),
                )
        })
        .collect();
    let biome = Biome::ALL[rng.gen_range(0..Biome::ALL.len())];
    (candidates, biome)
}

impl BiomeGenerator {
    /// The section holding the world origin starts seeded at the origin
    pub fn new(context: &GenerationContext) -> Self {
        let (_, biome) = section_draws(SectionPos::ORIGIN, context);
        let origin = BiomeSeed {
            biome,
            section: SectionPos::ORIGIN,
            seed_pos: Vector2::new(0.0, 0.0),
        };
        log::debug!("[BiomeGenerator::new] Origin biome is {:?}", origin.biome);

        let mut sections = FxHashMap::default();
        sections.insert(origin.section, MacroSection::Seeded(origin));
        Self { sections }
    }

    pub fn section(&self, pos: SectionPos) -> MacroSection {
        self.sections
            .get(&pos)
            .copied()
            .unwrap_or(MacroSection::Unresolved)
    }

    pub fn resolved_count(&self) -> usize {
        self.sections.len()
    }

    fn seed_in(&self, pos: SectionPos) -> Option<BiomeSeed> {
        match self.section(pos) {
            MacroSection::Seeded(seed) => Some(seed),
            MacroSection::Empty | MacroSection::Unresolved => None,
        }
    }

    /// Resolve one section; the memo only saves redrawing
    fn resolve_section(&mut self, pos: SectionPos, context: &GenerationContext) -> MacroSection {
        if let Some(state) = self.sections.get(&pos) {
            return *state;
        }

        let (candidates, biome) = section_draws(pos, context);
        let blockers: Vec<Vector2<f32>> = pos
            .neighborhood()
            .into_iter()
            .filter(|n| n.precedes(pos))
            .flat_map(|n| section_draws(n, context).0)
            .collect();

        let state = candidates
            .into_iter()
            .find(|candidate| blockers.iter().all(|b| b.distance(*candidate) >= SECTION_SIZE))
            .map_or(MacroSection::Empty, |seed_pos| {
                MacroSection::Seeded(BiomeSeed {
                    biome,
                    section: pos,
                    seed_pos,
                })
            });

        if state == MacroSection::Empty {
            log::trace!("[BiomeGenerator::resolve_section] Section {:?} left empty", pos);
        }
        self.sections.insert(pos, state);
        state
    }

    /// Resolve the 3x3 neighbourhood of `center`
    fn resolve_neighborhood(&mut self, center: SectionPos, context: &GenerationContext) {
        let worklist: Vec<SectionPos> = center
            .neighborhood()
            .into_iter()
            .filter(|pos| !self.sections.contains_key(pos))
            .collect();
        for pos in worklist {
            self.resolve_section(pos, context);
        }
    }

    /// Seeds in the 3x3 neighbourhood of `center`, resolving it first
    fn seeds_around(&mut self, center: SectionPos, context: &GenerationContext) -> Vec<BiomeSeed> {
        self.resolve_neighborhood(center, context);
        center
            .neighborhood()
            .iter()
            .filter_map(|pos| self.seed_in(*pos))
            .collect()
    }

    /// Closest seed to `point` among its section's neighbourhood; ties keep
    /// the first in neighbourhood order
    pub fn nearest_seed(&mut self, point: Vector2<f32>, context: &GenerationContext) -> Option<BiomeSeed> {
        let mut best: Option<(f32, BiomeSeed)> = None;
        for seed in self.seeds_around(SectionPos::containing(point), context) {
            let distance = seed.seed_pos.distance(point);
            if best.map_or(true, |(current, _)| distance < current) {
                best = Some((distance, seed));
            }
        }
        best.map(|(_, seed)| seed)
    }

    pub fn biome_at(&mut self, point: Vector2<f32>, context: &GenerationContext) -> Biome {
        self.nearest_seed(point, context)
            .map(|seed| seed.biome)
            .unwrap_or(Biome::Plains)
    }

    /// Maximum terrain height at `point`, eased toward neighbouring biomes
    /// whose seeds are almost as close as the nearest one
    pub fn height_at(&mut self, point: Vector2<f32>, context: &GenerationContext) -> f32 {
        let Some(main) = self.nearest_seed(point, context) else {
            return Biome::Plains.max_height();
        };
        let main_distance = main.seed_pos.distance(point);

        let mut weighted = main.biome.max_height();
        let mut total_weight = 1.0;
        for seed in self.seeds_around(main.section, context) {
            if seed.section == main.section {
                continue;
            }
            let gap = (seed.seed_pos.distance(point) - main_distance).max(0.0);
            if gap > EASE_DISTANCE {
                continue;
            }
            let weight = 1.0 - gap / EASE_DISTANCE;
            weighted += weight * seed.biome.max_height();
            total_weight += weight;
        }

        weighted / total_weight
    }
}
