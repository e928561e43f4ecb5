//! Flattened read-only view for renderers, HUDs and the JS bridge

use serde::Serialize;

use super::progression::{Biome, ThoughtTier, TimeOfDay, Weather};
use super::state::{Collectible, GamePhase, Hazard, SimulationState, VerticalMode};
use crate::tuning::Tuning;

/// Value copy of everything a frame needs to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub lane: i8,
    pub mode: VerticalMode,
    pub is_jumping: bool,
    pub is_sliding: bool,
    pub is_belly_sliding: bool,
    pub is_swimming: bool,
    pub is_slipping: bool,
    pub jump_height: f32,
    /// Player x including the slip wobble
    pub player_x: f32,

    pub distance: f32,
    pub score: u64,
    pub high_score: u64,
    pub forward_speed: f32,
    pub biome: Biome,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,

    pub combo: u32,
    pub combo_multiplier: f32,
    pub max_combo: u32,
    /// Belly-slide energy as a fraction of the maximum
    pub belly_energy: f32,
    pub belly_cooldown: f32,
    pub is_invincible: bool,
    pub is_slow_motion: bool,
    pub speed_boost: f32,

    pub milestone: Option<u32>,
    pub thought: Option<ThoughtTier>,
    pub memory: Option<u8>,
    pub flashback: Option<u32>,

    pub hazards: Vec<Hazard>,
    pub collectibles: Vec<Collectible>,
}

impl Snapshot {
    pub fn capture(state: &SimulationState, tuning: &Tuning) -> Self {
        let player = &state.player;
        let abilities = &state.abilities;
        let progression = &state.progression;
        Self {
            phase: state.phase,
            lane: player.lane.index(),
            mode: player.mode,
            is_jumping: player.mode == VerticalMode::Jumping,
            is_sliding: player.mode.is_sliding(),
            is_belly_sliding: player.mode == VerticalMode::BellySliding,
            is_swimming: player.mode == VerticalMode::Swimming,
            is_slipping: player.is_slipping(),
            jump_height: player.jump_height(),
            player_x: player.x(),

            distance: state.distance,
            score: state.score,
            high_score: state.high_score,
            forward_speed: state.forward_speed,
            biome: progression.biome,
            weather: progression.weather,
            time_of_day: progression.time_of_day,

            combo: abilities.combo.count,
            combo_multiplier: abilities.combo.multiplier(),
            max_combo: abilities.combo.max_this_run,
            belly_energy: abilities.belly_slide.energy / tuning.belly_slide_max_energy,
            belly_cooldown: abilities.belly_slide.cooldown,
            is_invincible: abilities.is_invincible(),
            is_slow_motion: abilities.is_slow_motion(),
            speed_boost: abilities.speed_boost,

            milestone: state.displays.milestone.map(|d| d.value),
            thought: state.displays.thought.map(|d| d.value),
            memory: state.displays.memory.map(|d| d.value),
            flashback: state.displays.flashback.map(|d| d.value),

            hazards: state.hazards.clone(),
            collectibles: state.collectibles.clone(),
        }
    }
}
