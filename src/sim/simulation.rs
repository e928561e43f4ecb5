//! Simulation controller
//!
//! Owns one run's state, its tuning and the seeded RNG. Commands are
//! fire-and-forget: a command the current state does not allow is dropped
//! and logged at trace level.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::snapshot::Snapshot;
use super::spawner::{place_collectible, place_hazard};
use super::state::{
    CollectibleKind, GameEvent, GamePhase, HazardKind, HeightTier, Lane, RunSummary, SimulationState,
};
use crate::input::Command;
use crate::tuning::{Tuning, TuningError};

/// A penguin run and everything needed to advance it deterministically
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) tuning: Tuning,
    pub(super) state: SimulationState,
    pub(super) rng: Pcg32,
    /// Seed the run seeds derive from
    base_seed: u64,
    runs_started: u64,
    last_run: Option<RunSummary>,
}

impl Simulation {
    /// New simulation on the title screen with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// New simulation with custom tuning (validated first)
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    fn build(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: SimulationState::new(seed, &tuning),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            base_seed: seed,
            runs_started: 0,
            last_run: None,
        }
    }

    /// Carry in the best score from an earlier session
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.state.high_score = self.state.high_score.max(high_score);
        self
    }

    // ---- read surface ----

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.tuning)
    }

    /// Take the cues produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    /// Summary of the most recently finished run
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub fn debug_mode(&self) -> bool {
        self.tuning.debug
    }

    // ---- lifecycle ----

    /// Begin a run from the title or game-over screen
    pub fn start_game(&mut self) {
        if self.state.is_playing() {
            log::trace!("start_game ignored: already playing");
            return;
        }
        self.begin_run();
    }

    /// Restart immediately, abandoning any run in progress
    pub fn reset_game(&mut self) {
        self.begin_run();
    }

    /// End the run. Does nothing unless a run is in progress.
    pub fn end_game(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.state.phase = GamePhase::GameOver;
        self.state.high_score = self.state.high_score.max(self.state.score);

        let summary = self.state.summary();
        log::info!(
            "Run over: distance {:.0}, score {}, max combo {}, reached {}",
            summary.distance,
            summary.score,
            summary.max_combo,
            summary.biome_reached.as_str()
        );
        self.state.emit(GameEvent::GameOver(summary.clone()));
        self.last_run = Some(summary);
    }

    /// Back to the title screen with a clean slate
    pub fn return_to_title(&mut self) {
        let high_score = self.state.high_score;
        self.state = SimulationState::new(self.base_seed, &self.tuning);
        self.state.high_score = high_score;
    }

    fn begin_run(&mut self) {
        let seed = self.base_seed.wrapping_add(self.runs_started);
        self.runs_started += 1;
        self.rng = Pcg32::seed_from_u64(seed);

        let high_score = self.state.high_score;
        self.state = SimulationState::new(seed, &self.tuning);
        self.state.high_score = high_score;
        self.state.phase = GamePhase::Playing;
        self.state
            .abilities
            .arm_invincibility(self.tuning.start_invincibility);
        self.state.emit(GameEvent::RunStarted { seed });
        log::info!("Run started (seed {seed})");
    }

    // ---- commands ----

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::Jump => self.jump(),
            Command::SlideStart => self.slide_start(),
            Command::SlideEnd => self.slide_end(),
            Command::BellySlideStart => self.belly_slide_start(),
            Command::BellySlideEnd => self.belly_slide_end(),
        }
    }

    /// Run a locomotion transition if playing, tracing rejections
    fn command(&mut self, name: &str, transition: impl FnOnce(&mut Self) -> bool) {
        if !self.state.is_playing() {
            log::trace!("{name} ignored outside a run");
            return;
        }
        if !transition(self) {
            log::trace!("{name} rejected in {:?}", self.state.player.mode);
        }
    }

    pub fn move_left(&mut self) {
        self.command("move_left", |sim| sim.state.player.move_left());
    }

    pub fn move_right(&mut self) {
        self.command("move_right", |sim| sim.state.player.move_right());
    }

    pub fn jump(&mut self) {
        self.command("jump", |sim| sim.state.player.jump());
    }

    pub fn slide_start(&mut self) {
        self.command("slide_start", |sim| sim.state.player.slide_start(&sim.tuning));
    }

    pub fn slide_end(&mut self) {
        self.command("slide_end", |sim| sim.state.player.slide_end());
    }

    pub fn belly_slide_start(&mut self) {
        self.command("belly_slide_start", |sim| {
            let state = &mut sim.state;
            state.player.belly_slide_start(&state.abilities.belly_slide)
        });
    }

    pub fn belly_slide_end(&mut self) {
        self.command("belly_slide_end", |sim| {
            let state = &mut sim.state;
            state
                .player
                .belly_slide_end(&mut state.abilities.belly_slide, &sim.tuning)
        });
    }

    // ---- scoring ----

    /// Award points through the combo multiplier. Returns the points added.
    pub fn add_score(&mut self, points: u32) -> u64 {
        let awarded = super::abilities::combo_score(points, &self.state.abilities.combo);
        self.state.score += awarded;
        awarded
    }

    /// Extend the combo; each new tier arms the speed boost
    pub fn add_combo(&mut self) {
        let abilities = &mut self.state.abilities;
        if abilities.combo.add(self.tuning.combo_window) {
            abilities.speed_boost = self.tuning.speed_boost_duration;
            log::debug!("Combo tier {} reached", abilities.combo.tier());
        }
    }

    // ---- direct placement (tools and tests) ----

    /// Place a hazard at an exact track offset
    pub fn spawn_hazard(&mut self, kind: HazardKind, lane: Lane, position: f32) -> u32 {
        place_hazard(&mut self.state, kind, lane, position, 0.0, 1.0)
    }

    /// Place a collectible at an exact track offset
    pub fn spawn_collectible(
        &mut self,
        kind: CollectibleKind,
        lane: Lane,
        position: f32,
        height: HeightTier,
    ) -> u32 {
        place_collectible(&mut self.state, kind, lane, position, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::VerticalMode;

    fn playing() -> Simulation {
        let mut sim = Simulation::new(42);
        sim.start_game();
        sim
    }

    #[test]
    fn commands_ignored_on_title() {
        let mut sim = Simulation::new(1);
        sim.move_left();
        sim.jump();
        assert_eq!(sim.state().player.lane, Lane::Center);
        assert_eq!(sim.state().player.mode, VerticalMode::Standing);
    }

    #[test]
    fn start_game_arms_invincibility_and_announces() {
        let mut sim = playing();
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.state().abilities.invincibility, sim.tuning().start_invincibility);
        let events = sim.drain_events();
        assert!(matches!(events.as_slice(), [GameEvent::RunStarted { .. }]));
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn end_game_is_idempotent() {
        let mut sim = playing().with_high_score(5);
        sim.add_score(30);
        sim.end_game();
        sim.end_game();
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert_eq!(sim.state().high_score, 30);
        let game_overs = sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(sim.last_run().map(|r| r.score), Some(30));
    }

    #[test]
    fn high_score_survives_restarts() {
        let mut sim = Simulation::new(3).with_high_score(100);
        sim.start_game();
        sim.add_score(10);
        sim.end_game();
        sim.reset_game();
        assert_eq!(sim.state().score, 0);
        assert_eq!(sim.state().high_score, 100);
        sim.return_to_title();
        assert_eq!(sim.phase(), GamePhase::Title);
        assert_eq!(sim.state().high_score, 100);
    }

    #[test]
    fn start_game_while_playing_keeps_run() {
        let mut sim = playing();
        sim.add_score(10);
        sim.start_game();
        assert_eq!(sim.state().score, 10);
    }

    #[test]
    fn combo_tier_arms_speed_boost() {
        let mut sim = playing();
        for _ in 0..4 {
            sim.add_combo();
        }
        assert_eq!(sim.state().abilities.speed_boost, 0.0);
        sim.add_combo();
        assert_eq!(sim.state().abilities.speed_boost, sim.tuning().speed_boost_duration);
    }

    #[test]
    fn apply_routes_commands() {
        let mut sim = playing();
        sim.apply(Command::MoveRight);
        sim.apply(Command::Jump);
        assert_eq!(sim.state().player.lane, Lane::Right);
        assert_eq!(sim.state().player.mode, VerticalMode::Jumping);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let tuning = Tuning {
            start_speed: 2.0,
            ..Tuning::default()
        };
        assert!(Simulation::with_tuning(1, tuning).is_err());
    }

    #[test]
    fn runs_are_reproducible() {
        let mut a = Simulation::new(9);
        let mut b = Simulation::new(9);
        a.start_game();
        b.start_game();
        for _ in 0..600 {
            a.frame(1.0 / 60.0);
            b.frame(1.0 / 60.0);
        }
        assert_eq!(a.state().hazards, b.state().hazards);
        assert_eq!(a.state().distance, b.state().distance);
    }
}
