//! Simulation state and core entity types
//!
//! Everything a renderer, HUD or audio layer may want to read lives here.
//! Mutation happens only through [`super::Simulation`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::abilities::Abilities;
use super::progression::{Biome, Progression, ThoughtTier, TimeOfDay, Weather};
use super::spawner::SpawnerState;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing advances
    #[default]
    Title,
    /// Active gameplay
    Playing,
    /// Run ended, final stats are frozen
    GameOver,
}

/// One of the three horizontal slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Signed lane index (-1, 0, 1)
    pub fn index(self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    pub fn from_index(index: i8) -> Option<Self> {
        match index {
            -1 => Some(Lane::Left),
            0 => Some(Lane::Center),
            1 => Some(Lane::Right),
            _ => None,
        }
    }

    /// Neighbor to the left, saturating at the edge
    pub fn left(self) -> Self {
        match self {
            Lane::Right => Lane::Center,
            _ => Lane::Left,
        }
    }

    /// Neighbor to the right, saturating at the edge
    pub fn right(self) -> Self {
        match self {
            Lane::Left => Lane::Center,
            _ => Lane::Right,
        }
    }

    /// World-space x of the lane center
    pub fn x(self) -> f32 {
        crate::lane_to_x(self.index())
    }
}

/// Vertical locomotion mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalMode {
    #[default]
    Standing,
    Jumping,
    /// Short tap slide
    Sliding,
    /// Energy-gated held slide; also counts as sliding
    BellySliding,
    Swimming,
}

impl VerticalMode {
    pub fn is_sliding(self) -> bool {
        matches!(self, VerticalMode::Sliding | VerticalMode::BellySliding)
    }
}

/// Loss of lateral control after touching an ice patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slip {
    /// Seconds of slipping left
    pub timer: f32,
    /// Oscillation phase (radians)
    pub phase: f32,
}

/// The penguin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub lane: Lane,
    pub mode: VerticalMode,
    /// Jump arc progress in [0, 1); only meaningful while jumping
    pub jump_progress: f32,
    /// Seconds left on a tap slide
    pub slide_timer: f32,
    pub slip: Option<Slip>,
}

impl Player {
    pub fn is_slipping(&self) -> bool {
        self.slip.is_some()
    }

    /// Height of the rendered jump arc
    pub fn jump_height(&self) -> f32 {
        if self.mode == VerticalMode::Jumping {
            (self.jump_progress * std::f32::consts::PI).sin() * JUMP_HEIGHT
        } else {
            0.0
        }
    }

    /// Sideways offset from the lane center (non-zero only while slipping)
    pub fn lateral_offset(&self) -> f32 {
        self.slip
            .map(|slip| slip.phase.sin() * SLIP_AMPLITUDE)
            .unwrap_or(0.0)
    }

    /// World-space x used for collision
    pub fn x(&self) -> f32 {
        self.lane.x() + self.lateral_offset()
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Ice,
    Rock,
    Crevasse,
    LargeCrevasse,
    Seal,
    Fox,
    Snowball,
    IcePatch,
    Water,
}

impl HazardKind {
    pub const ALL: [HazardKind; 9] = [
        HazardKind::Ice,
        HazardKind::Rock,
        HazardKind::Crevasse,
        HazardKind::LargeCrevasse,
        HazardKind::Seal,
        HazardKind::Fox,
        HazardKind::Snowball,
        HazardKind::IcePatch,
        HazardKind::Water,
    ];
}

/// An obstacle on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub lane: Lane,
    pub kind: HazardKind,
    /// Track offset relative to the player (negative = ahead)
    pub position: f32,
    /// Visual yaw (radians)
    pub rotation: f32,
    /// Size multiplier (snowballs vary, everything else is 1)
    pub scale: f32,
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Fish,
    /// Rare glowing fish carrying a memory fragment
    GoldenFish { memory: u8 },
}

/// Height a collectible floats at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightTier {
    #[default]
    Ground,
    /// Reachable only mid-jump
    High,
}

impl HeightTier {
    /// Center height of the pickup
    pub fn y(self) -> f32 {
        match self {
            HeightTier::Ground => 0.5,
            HeightTier::High => 1.6,
        }
    }
}

/// A pickup on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub lane: Lane,
    pub kind: CollectibleKind,
    pub position: f32,
    pub height: HeightTier,
    pub collected: bool,
    /// Seconds since collection (drives the shrink cue)
    pub fade: f32,
}

/// A notification that stays visible for a while, then clears itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Display<T> {
    pub value: T,
    pub remaining: f32,
}

impl<T> Display<T> {
    pub fn new(value: T, duration: f32) -> Self {
        Self {
            value,
            remaining: duration,
        }
    }
}

/// Count down an optional display, clearing it once expired
pub(crate) fn advance_display<T>(slot: &mut Option<Display<T>>, dt: f32) {
    if let Some(display) = slot {
        display.remaining -= dt;
        if display.remaining <= 0.0 {
            *slot = None;
        }
    }
}

/// One-shot overlays for the UI layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Displays {
    /// Last milestone distance reached
    pub milestone: Option<Display<u32>>,
    pub thought: Option<Display<ThoughtTier>>,
    /// Memory fragment index from a golden fish
    pub memory: Option<Display<u8>>,
    /// Distance of the flashback being replayed
    pub flashback: Option<Display<u32>>,
}

/// End-of-run stats handed to persistence/leaderboard collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub distance: f32,
    pub score: u64,
    pub max_combo: u32,
    pub biome_reached: Biome,
    pub fish_collected: u32,
}

/// Discrete cues for audio/UI, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    BiomeChanged(Biome),
    WeatherChanged(Weather),
    TimeOfDayChanged(TimeOfDay),
    Milestone(u32),
    Thought(ThoughtTier),
    Flashback(u32),
    MemoryFragment(u8),
    FishCollected { points: u64, combo: u32, golden: bool },
    SlipStarted,
    SwimStarted,
    SwimEnded,
    GameOver(RunSummary),
}

/// Broken internal invariant (a programming defect, never player input)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("belly slide energy {0} outside [0, max]")]
    Energy(f32),
    #[error("negative timer `{name}`: {value}")]
    NegativeTimer { name: &'static str, value: f32 },
    #[error("entity `{0}` drifted past the despawn offset")]
    Unbounded(u32),
    #[error("entity ids out of spawn order")]
    SpawnOrder,
    #[error("forward speed {0} exceeds the ceiling")]
    Speed(f32),
}

/// Undrained cues kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// Speed-weighted distance covered this run
    pub distance: f32,
    pub score: u64,
    /// Best score across runs (seeded by the persistence layer)
    pub high_score: u64,
    /// Seconds of simulation time this run (slow motion applied)
    pub elapsed: f32,
    pub player: Player,
    pub base_speed: f32,
    pub forward_speed: f32,
    pub abilities: Abilities,
    pub progression: Progression,
    pub spawner: SpawnerState,
    /// Active hazards in spawn order
    pub hazards: Vec<Hazard>,
    /// Active collectibles in spawn order
    pub collectibles: Vec<Collectible>,
    pub fish_collected: u32,
    pub displays: Displays,
    /// Cues produced since the last drain, oldest first
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl SimulationState {
    /// Fresh title-screen state
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            phase: GamePhase::Title,
            distance: 0.0,
            score: 0,
            high_score: 0,
            elapsed: 0.0,
            player: Player::default(),
            base_speed: tuning.start_speed,
            forward_speed: tuning.start_speed,
            abilities: Abilities::new(tuning),
            progression: Progression::default(),
            spawner: SpawnerState::default(),
            hazards: Vec::new(),
            collectibles: Vec::new(),
            fish_collected: 0,
            displays: Displays::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn biome(&self) -> Biome {
        self.progression.biome
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Queue a cue for the host. Hosts drain once per frame; a host that
    /// never drains loses the oldest cues past [`MAX_PENDING_EVENTS`].
    pub fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let dropped = self.events.remove(0);
            log::trace!("Event queue full, dropped {dropped:?}");
        }
        self.events.push(event);
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            distance: self.distance,
            score: self.score,
            max_combo: self.abilities.combo.max_this_run,
            biome_reached: self.progression.biome,
            fish_collected: self.fish_collected,
        }
    }

    /// Verify the invariants the rest of the crate relies on
    pub fn check_invariants(&self, tuning: &Tuning) -> Result<(), InvariantViolation> {
        let belly = &self.abilities.belly_slide;
        if !(0.0..=tuning.belly_slide_max_energy).contains(&belly.energy) {
            return Err(InvariantViolation::Energy(belly.energy));
        }

        let timers = [
            ("belly_slide_cooldown", belly.cooldown),
            ("combo_timer", self.abilities.combo.timer),
            ("invincibility", self.abilities.invincibility),
            ("speed_boost", self.abilities.speed_boost),
            ("slow_motion", self.abilities.slow_motion),
            ("slide_timer", self.player.slide_timer),
        ];
        for (name, value) in timers {
            if value < 0.0 {
                return Err(InvariantViolation::NegativeTimer { name, value });
            }
        }
        if let Some(slip) = self.player.slip.filter(|slip| slip.timer < 0.0) {
            return Err(InvariantViolation::NegativeTimer {
                name: "slip",
                value: slip.timer,
            });
        }

        if self.forward_speed > tuning.max_speed + f32::EPSILON {
            return Err(InvariantViolation::Speed(self.forward_speed));
        }

        if let Some(h) = self.hazards.iter().find(|h| h.position >= DESPAWN_OFFSET) {
            return Err(InvariantViolation::Unbounded(h.id));
        }
        if let Some(c) = self.collectibles.iter().find(|c| c.position >= DESPAWN_OFFSET) {
            return Err(InvariantViolation::Unbounded(c.id));
        }

        let ordered = self.hazards.windows(2).all(|w| w[0].id < w[1].id)
            && self.collectibles.windows(2).all(|w| w[0].id < w[1].id);
        if !ordered {
            return Err(InvariantViolation::SpawnOrder);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_moves_saturate() {
        assert_eq!(Lane::Left.left(), Lane::Left);
        assert_eq!(Lane::Center.left(), Lane::Left);
        assert_eq!(Lane::Right.right(), Lane::Right);
        assert_eq!(Lane::Left.right(), Lane::Center);
    }

    #[test]
    fn lane_index_round_trips_only_valid_values() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_index(lane.index()), Some(lane));
        }
        assert_eq!(Lane::from_index(2), None);
        assert_eq!(Lane::Right.x(), LANE_WIDTH);
    }

    #[test]
    fn belly_slide_counts_as_sliding() {
        assert!(VerticalMode::BellySliding.is_sliding());
        assert!(VerticalMode::Sliding.is_sliding());
        assert!(!VerticalMode::Jumping.is_sliding());
    }

    #[test]
    fn jump_height_peaks_mid_arc() {
        let player = Player {
            mode: VerticalMode::Jumping,
            jump_progress: 0.5,
            ..Default::default()
        };
        assert!((player.jump_height() - JUMP_HEIGHT).abs() < 1e-5);
        assert_eq!(Player::default().jump_height(), 0.0);
    }

    #[test]
    fn display_expires() {
        let mut slot = Some(Display::new(500u32, 1.0));
        advance_display(&mut slot, 0.6);
        assert!(slot.is_some());
        advance_display(&mut slot, 0.6);
        assert!(slot.is_none());
    }

    #[test]
    fn undrained_events_are_capped() {
        let tuning = Tuning::default();
        let mut state = SimulationState::new(7, &tuning);
        for distance in 0..MAX_PENDING_EVENTS as u32 + 10 {
            state.emit(GameEvent::Milestone(distance));
        }
        let pending = state.pending_events();
        assert_eq!(pending.len(), MAX_PENDING_EVENTS);
        assert_eq!(pending.first(), Some(&GameEvent::Milestone(10)));
        assert_eq!(state.take_events().len(), MAX_PENDING_EVENTS);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn fresh_state_holds_invariants() {
        let tuning = Tuning::default();
        let state = SimulationState::new(7, &tuning);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(state.check_invariants(&tuning).is_ok());
    }

    #[test]
    fn invariant_check_flags_bad_energy() {
        let tuning = Tuning::default();
        let mut state = SimulationState::new(7, &tuning);
        state.abilities.belly_slide.energy = -0.1;
        assert!(matches!(
            state.check_invariants(&tuning),
            Err(InvariantViolation::Energy(_))
        ));
    }
}
