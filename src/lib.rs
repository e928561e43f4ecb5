//! Penguin Run - endless-runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (locomotion, progression, spawning, collisions)
//! - `input`: Keyboard/touch mapping onto simulation commands
//! - `tuning`: Data-driven game balance
//! - `web`: Browser bindings (wasm32 only)

pub mod input;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Command, KeyPhase, TouchTracker};
pub use sim::{GameEvent, GamePhase, Simulation, SimulationState, Snapshot};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (geometry and frame timing)
pub mod consts {
    /// Reference frame rate that speeds are expressed against (units per frame)
    pub const FRAME_RATE: f32 = 60.0;
    /// Longest elapsed time a single frame may advance the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Horizontal distance between lane centers
    pub const LANE_WIDTH: f32 = 2.0;

    /// Track offsets (player sits at 0, the world moves toward +z)
    pub const HAZARD_SPAWN_OFFSET: f32 = -70.0;
    pub const FISH_SPAWN_OFFSET: f32 = -60.0;
    pub const GOLDEN_FISH_SPAWN_OFFSET: f32 = -50.0;
    pub const DESPAWN_OFFSET: f32 = 10.0;

    /// Entities closer than this to the player get a full AABB test
    pub const COLLISION_BAND: f32 = 1.5;

    /// Player hitbox footprint - deliberately smaller than the penguin mesh
    pub const PLAYER_HITBOX_WIDTH: f32 = 0.6;
    pub const PLAYER_HITBOX_DEPTH: f32 = 0.6;

    /// Peak of the rendered jump arc
    pub const JUMP_HEIGHT: f32 = 1.5;

    /// Lateral wobble while slipping on ice
    pub const SLIP_AMPLITUDE: f32 = 0.5;
    /// Radians per second of the slip wobble
    pub const SLIP_FREQUENCY: f32 = 12.0;

    /// Seconds a collected fish lingers for its shrink animation
    pub const COLLECT_FADE: f32 = 0.4;
}

/// X coordinate of a lane index (-1, 0, 1)
#[inline]
pub fn lane_to_x(lane: i8) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}
