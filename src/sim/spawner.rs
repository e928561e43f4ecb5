//! Procedural hazard and fish spawning
//!
//! Two distance accumulators (hazards, fish) fill with the distance the track
//! covers each tick; the golden fish rolls on a fixed sim-time cadence.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::progression::Biome;
use super::state::{Collectible, CollectibleKind, Hazard, HazardKind, HeightTier, Lane, SimulationState};
use crate::consts::*;
use crate::tuning::Tuning;

/// Hazards in a same-lane pattern
pub const PATTERN_LENGTH: usize = 3;
/// Track gap between pattern members
pub const PATTERN_SPACING: f32 = 6.0;
/// Patterns only start after this distance
const PATTERN_MIN_DISTANCE: f32 = 300.0;
/// High fish only appear past this distance
const HIGH_FISH_MIN_DISTANCE: f32 = 500.0;
/// Number of memory fragments carried by golden fish
pub const MEMORY_FRAGMENTS: u8 = 4;

/// Spawner accumulators carried between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnerState {
    /// Distance since the last hazard spawn
    pub hazard_accum: f32,
    /// Distance since the last fish spawn
    pub fish_accum: f32,
    /// Sim seconds since the last golden fish roll
    pub special_timer: f32,
    /// Bitmask of memory fragments already collected this run
    pub memories_found: u8,
}

impl SpawnerState {
    pub fn memory_found(&self, index: u8) -> bool {
        self.memories_found & (1 << index) != 0
    }

    /// Record a fragment. Returns false if it was already known.
    pub fn mark_memory(&mut self, index: u8) -> bool {
        let fresh = !self.memory_found(index);
        self.memories_found |= 1 << index;
        fresh
    }

    fn unused_memories(&self) -> Vec<u8> {
        (0..MEMORY_FRAGMENTS).filter(|i| !self.memory_found(*i)).collect()
    }
}

/// Hazard kinds available at a distance. Grows monotonically.
pub fn unlocked_kinds(distance: f32) -> Vec<HazardKind> {
    let mut kinds = vec![HazardKind::Ice, HazardKind::Rock, HazardKind::Crevasse];
    if distance > 200.0 {
        kinds.extend([HazardKind::Seal, HazardKind::IcePatch]);
    }
    if distance > 500.0 {
        kinds.extend([HazardKind::Fox, HazardKind::Snowball]);
    }
    if distance > 1000.0 {
        kinds.push(HazardKind::LargeCrevasse);
    }
    if distance > 1500.0 {
        kinds.push(HazardKind::Water);
    }
    kinds
}

/// Track distance between hazard spawns
pub fn hazard_interval(distance: f32, biome: Biome, tuning: &Tuning) -> f32 {
    let reduction = (distance / 2000.0).clamp(0.0, 0.6);
    let interval = (tuning.hazard_interval_base - 10.0 * reduction) / biome.difficulty();
    interval.max(tuning.hazard_interval_min)
}

fn random_lane<R: Rng>(rng: &mut R) -> Lane {
    Lane::ALL[rng.random_range(0..Lane::ALL.len())]
}

/// Push a hazard onto the track
pub fn place_hazard(
    state: &mut SimulationState,
    kind: HazardKind,
    lane: Lane,
    position: f32,
    rotation: f32,
    scale: f32,
) -> u32 {
    let id = state.next_entity_id();
    state.hazards.push(Hazard {
        id,
        lane,
        kind,
        position,
        rotation,
        scale,
    });
    log::debug!("spawned {kind:?} #{id} in {lane:?} at {position:.1}");
    id
}

/// Push a collectible onto the track
pub fn place_collectible(
    state: &mut SimulationState,
    kind: CollectibleKind,
    lane: Lane,
    position: f32,
    height: HeightTier,
) -> u32 {
    let id = state.next_entity_id();
    state.collectibles.push(Collectible {
        id,
        lane,
        kind,
        position,
        height,
        collected: false,
        fade: 0.0,
    });
    log::debug!("spawned {kind:?} #{id} in {lane:?} at {position:.1}");
    id
}

/// One random hazard from the unlocked pool
fn spawn_single<R: Rng>(state: &mut SimulationState, rng: &mut R) {
    let kinds = unlocked_kinds(state.distance);
    let kind = kinds[rng.random_range(0..kinds.len())];
    let lane = random_lane(rng);
    let rotation = rng.random::<f32>() * TAU;
    let scale = if kind == HazardKind::Snowball {
        0.8 + rng.random::<f32>() * 0.6
    } else {
        1.0
    };
    place_hazard(state, kind, lane, HAZARD_SPAWN_OFFSET, rotation, scale);
}

/// A run of identical hazards down one lane
fn spawn_pattern<R: Rng>(state: &mut SimulationState, rng: &mut R) {
    let kinds: Vec<HazardKind> = unlocked_kinds(state.distance)
        .into_iter()
        .filter(|k| !matches!(k, HazardKind::Water | HazardKind::IcePatch))
        .collect();
    let kind = kinds[rng.random_range(0..kinds.len())];
    let lane = random_lane(rng);
    for i in 0..PATTERN_LENGTH {
        let position = HAZARD_SPAWN_OFFSET - i as f32 * PATTERN_SPACING;
        let rotation = rng.random::<f32>() * TAU;
        place_hazard(state, kind, lane, position, rotation, 1.0);
    }
}

fn spawn_fish<R: Rng>(state: &mut SimulationState, tuning: &Tuning, rng: &mut R) {
    let lane = random_lane(rng);
    let height = if state.distance > HIGH_FISH_MIN_DISTANCE && rng.random_bool(tuning.high_fish_chance as f64) {
        HeightTier::High
    } else {
        HeightTier::Ground
    };
    place_collectible(state, CollectibleKind::Fish, lane, FISH_SPAWN_OFFSET, height);
}

fn spawn_golden_fish<R: Rng>(state: &mut SimulationState, rng: &mut R) {
    let unused = state.spawner.unused_memories();
    let memory = if unused.is_empty() {
        rng.random_range(0..MEMORY_FRAGMENTS)
    } else {
        unused[rng.random_range(0..unused.len())]
    };
    let lane = random_lane(rng);
    place_collectible(
        state,
        CollectibleKind::GoldenFish { memory },
        lane,
        GOLDEN_FISH_SPAWN_OFFSET,
        HeightTier::Ground,
    );
}

/// Fill the accumulators with `travel` units of track and spawn what is due
pub fn advance_spawner<R: Rng>(
    state: &mut SimulationState,
    travel: f32,
    dt: f32,
    tuning: &Tuning,
    rng: &mut R,
) {
    state.spawner.hazard_accum += travel;
    let interval = hazard_interval(state.distance, state.biome(), tuning);
    if state.spawner.hazard_accum >= interval {
        state.spawner.hazard_accum = 0.0;
        let pattern =
            state.distance > PATTERN_MIN_DISTANCE && rng.random_bool(tuning.pattern_chance as f64);
        if pattern {
            spawn_pattern(state, rng);
        } else {
            spawn_single(state, rng);
        }
    }

    state.spawner.fish_accum += travel;
    if state.spawner.fish_accum >= tuning.fish_interval {
        state.spawner.fish_accum = 0.0;
        spawn_fish(state, tuning, rng);
    }

    state.spawner.special_timer += dt;
    while state.spawner.special_timer >= tuning.special_check_interval {
        state.spawner.special_timer -= tuning.special_check_interval;
        if rng.random_bool(tuning.special_chance as f64) {
            spawn_golden_fish(state, rng);
        }
    }
}
