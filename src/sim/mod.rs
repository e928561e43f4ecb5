//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time is passed in, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod abilities;
pub mod collision;
pub mod hitbox;
pub mod locomotion;
pub mod progression;
pub mod simulation;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use abilities::{Abilities, BellySlide, COMBO_TIER, Combo, combo_score};
pub use collision::{CollisionReport, Outcome, Terminal, detect};
pub use hitbox::{Aabb, CollisionProfile, OutcomePolicy, PASS_UNDER_THRESHOLD, is_terminal};
pub use progression::{
    Biome, FLASHBACK_DISTANCES, Progression, ThoughtTier, TimeOfDay, Weather, biome_for_distance,
};
pub use simulation::Simulation;
pub use snapshot::Snapshot;
pub use spawner::{SpawnerState, hazard_interval, unlocked_kinds};
pub use state::{
    Collectible, CollectibleKind, GameEvent, GamePhase, Hazard, HazardKind, HeightTier,
    InvariantViolation, Lane, MAX_PENDING_EVENTS, Player, RunSummary, SimulationState, VerticalMode,
};
pub use tick::{FISH_POINTS, GOLDEN_FISH_POINTS};
