//! Per-frame simulation tick
//!
//! `frame` composes the individual entrypoints in a fixed order. Each
//! entrypoint is public so hosts and tests can drive one subsystem at a time;
//! all of them do nothing unless a run is in progress.

use super::collision::{CollisionReport, Outcome, detect};
use super::progression::forward_speed;
use super::simulation::Simulation;
use super::spawner::advance_spawner;
use super::state::{CollectibleKind, Display, GameEvent, VerticalMode, advance_display};
use crate::consts::*;

/// Points for a regular fish
pub const FISH_POINTS: u32 = 10;
/// Points for a golden fish
pub const GOLDEN_FISH_POINTS: u32 = 50;

impl Simulation {
    /// Advance one rendered frame
    ///
    /// `dt` is wall-clock seconds since the last frame; it is clamped to
    /// [`MAX_FRAME_DT`] and scaled while slow motion is active.
    pub fn frame(&mut self, dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        let real_dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let sim_dt = real_dt * self.state.abilities.time_scale(&self.tuning);
        if self.state.abilities.advance_slow_motion(real_dt) {
            log::debug!("Slow motion over");
        }

        self.state.player.advance(sim_dt, &self.tuning);
        self.advance_abilities(sim_dt);
        self.advance_combo(sim_dt);
        self.advance_invincibility(sim_dt);

        let travel = self.advance_progression(sim_dt);
        self.advance_entities(travel, sim_dt);
        advance_spawner(&mut self.state, travel, sim_dt, &self.tuning, &mut self.rng);

        let displays = &mut self.state.displays;
        advance_display(&mut displays.milestone, sim_dt);
        advance_display(&mut displays.thought, sim_dt);
        advance_display(&mut displays.memory, sim_dt);
        advance_display(&mut displays.flashback, sim_dt);
        self.state.elapsed += sim_dt;

        self.resolve_collisions(travel);

        debug_assert_eq!(self.state.check_invariants(&self.tuning), Ok(()));
    }

    /// Distance, speed, biome, environment cycles, milestones and thoughts.
    /// Returns the track distance covered.
    pub fn advance_progression(&mut self, dt: f32) -> f32 {
        if !self.state.is_playing() {
            return 0.0;
        }
        let tuning = &self.tuning;
        let state = &mut self.state;

        let travel = dt * FRAME_RATE * state.forward_speed;
        state.distance += travel;

        let steps = state.progression.take_speed_steps(state.distance, tuning);
        for _ in 0..steps {
            state.base_speed = (state.base_speed + tuning.speed_step).min(tuning.max_speed);
        }
        state.forward_speed = forward_speed(
            state.base_speed,
            state.distance,
            state.player.mode == VerticalMode::BellySliding,
            state.abilities.speed_boost > 0.0,
            tuning,
        );

        if let Some(biome) = state.progression.update_biome(state.distance) {
            log::info!("Entered {} at {:.0}", biome.as_str(), state.distance);
            state.emit(GameEvent::BiomeChanged(biome));
        }
        if let Some(weather) = state.progression.advance_weather(dt, tuning, &mut self.rng) {
            log::debug!("Weather now {weather:?}");
            state.emit(GameEvent::WeatherChanged(weather));
        }
        if let Some(phase) = state.progression.advance_clock(dt, tuning) {
            state.emit(GameEvent::TimeOfDayChanged(phase));
        }
        for milestone in state.progression.take_milestones(state.distance, tuning) {
            log::info!("Milestone {milestone}");
            state.displays.milestone = Some(Display::new(milestone, tuning.milestone_display));
            state.emit(GameEvent::Milestone(milestone));
        }
        if let Some(tier) = state.progression.take_thought(state.distance, &mut self.rng) {
            state.displays.thought = Some(Display::new(tier, tuning.thought_display));
            state.emit(GameEvent::Thought(tier));
        }
        if let Some(at) = state.progression.take_flashback(state.distance) {
            log::info!("Flashback at {at}");
            state.displays.flashback = Some(Display::new(at, tuning.flashback_display));
            state.emit(GameEvent::Flashback(at));
        }
        travel
    }

    /// Belly-slide drain/regen and the combo speed boost
    pub fn advance_abilities(&mut self, dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        let tuning = &self.tuning;
        let state = &mut self.state;
        let belly = &mut state.abilities.belly_slide;

        if state.player.mode == VerticalMode::BellySliding {
            if belly.drain(dt, tuning) {
                state.player.belly_slide_end(belly, tuning);
                log::debug!("Belly slide ran dry, cooldown {:.1}s", belly.cooldown);
            }
        } else {
            belly.recover(dt, tuning);
        }
        state.abilities.advance_speed_boost(dt);
    }

    pub fn advance_combo(&mut self, dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        let combo = &mut self.state.abilities.combo;
        let streak = combo.count;
        if combo.advance(dt) {
            log::debug!("Combo of {streak} lapsed");
        }
    }

    pub fn advance_invincibility(&mut self, dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        self.state.abilities.advance_invincibility(dt);
    }

    /// Test the penguin against everything currently near it
    pub fn run_collision_pass(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.resolve_collisions(0.0);
    }

    fn advance_entities(&mut self, travel: f32, dt: f32) {
        let state = &mut self.state;
        for hazard in &mut state.hazards {
            hazard.position += travel;
        }
        state.hazards.retain(|h| h.position < DESPAWN_OFFSET);

        for collectible in &mut state.collectibles {
            collectible.position += travel;
            if collectible.collected {
                collectible.fade += dt;
            }
        }
        state
            .collectibles
            .retain(|c| c.position < DESPAWN_OFFSET && !(c.collected && c.fade >= COLLECT_FADE));
    }

    fn resolve_collisions(&mut self, sweep: f32) {
        let report = detect(&self.state, sweep);
        self.apply_collisions(report);
    }

    /// Second phase: apply what detection found, terminal last
    fn apply_collisions(&mut self, report: CollisionReport) {
        for outcome in report.outcomes {
            match outcome {
                Outcome::Slip { hazard_id } => {
                    if self.state.player.set_slipping(true, &self.tuning) {
                        log::debug!("Slipped on ice patch #{hazard_id}");
                        self.state.emit(GameEvent::SlipStarted);
                    }
                }
                Outcome::Collect {
                    collectible_id,
                    kind,
                } => self.collect(collectible_id, kind),
            }
        }

        if let Some(terminal) = report.terminal {
            log::debug!("Hit {:?} #{}", terminal.kind, terminal.hazard_id);
            self.state.hazards.retain(|h| h.id != terminal.hazard_id);
            self.end_game();
            return;
        }

        let state = &mut self.state;
        let was_swimming = state.player.mode == VerticalMode::Swimming;
        let changed = state.player.set_swimming(
            report.in_water,
            &mut state.abilities.belly_slide,
            &self.tuning,
        );
        if changed {
            state.emit(if was_swimming {
                GameEvent::SwimEnded
            } else {
                GameEvent::SwimStarted
            });
        }
    }

    fn collect(&mut self, id: u32, kind: CollectibleKind) {
        let Some(collectible) = self.state.collectibles.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if collectible.collected {
            return;
        }
        collectible.collected = true;

        let golden = matches!(kind, CollectibleKind::GoldenFish { .. });
        let points = self.add_score(if golden { GOLDEN_FISH_POINTS } else { FISH_POINTS });
        self.add_combo();
        self.state.fish_collected += 1;

        if let CollectibleKind::GoldenFish { memory } = kind {
            let abilities = &mut self.state.abilities;
            abilities.slow_motion = self.tuning.slow_motion_duration;
            abilities.arm_invincibility(self.tuning.special_invincibility);
            if self.state.spawner.mark_memory(memory) {
                log::info!("Memory fragment {memory} recovered");
                self.state.displays.memory = Some(Display::new(memory, self.tuning.memory_display));
                self.state.emit(GameEvent::MemoryFragment(memory));
            }
        }

        self.state.emit(GameEvent::FishCollected {
            points,
            combo: self.state.abilities.combo.count,
            golden,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, HazardKind, HeightTier, Lane};

    fn vulnerable() -> Simulation {
        let mut sim = Simulation::new(17);
        sim.start_game();
        sim.state.abilities.invincibility = 0.0;
        sim.drain_events();
        sim
    }

    #[test]
    fn frame_does_nothing_outside_a_run() {
        let mut sim = Simulation::new(1);
        sim.frame(0.016);
        assert_eq!(sim.state().distance, 0.0);
        assert_eq!(sim.state().elapsed, 0.0);
    }

    #[test]
    fn frame_clamps_long_pauses() {
        let mut sim = vulnerable();
        sim.frame(5.0);
        let expected = MAX_FRAME_DT * FRAME_RATE * sim.tuning().start_speed;
        assert!((sim.state().distance - expected).abs() < 1e-4);
        sim.frame(f32::NAN);
        assert!((sim.state().distance - expected).abs() < 1e-4);
    }

    #[test]
    fn slow_motion_scales_distance() {
        let mut sim = vulnerable();
        sim.state.abilities.slow_motion = 1.0;
        sim.frame(0.1);
        let expected = 0.1 * sim.tuning().slow_motion_factor * FRAME_RATE * sim.tuning().start_speed;
        assert!((sim.state().distance - expected).abs() < 1e-4);
        // Timer runs on real time
        assert!((sim.state().abilities.slow_motion - 0.9).abs() < 1e-5);
    }

    #[test]
    fn speed_ratchets_every_interval() {
        let mut sim = vulnerable();
        sim.state.distance = 499.9;
        sim.advance_progression(0.1);
        assert!((sim.state().base_speed - 0.31).abs() < 1e-6);
        sim.advance_progression(0.1);
        assert!((sim.state().base_speed - 0.31).abs() < 1e-6);
    }

    #[test]
    fn milestone_sets_display_then_clears() {
        let mut sim = vulnerable();
        sim.state.distance = 499.0;
        sim.advance_progression(0.1);
        assert_eq!(sim.state().displays.milestone.map(|d| d.value), Some(500));
        assert!(sim.drain_events().contains(&GameEvent::Milestone(500)));
        for _ in 0..40 {
            sim.frame(0.1);
        }
        assert!(sim.state().displays.milestone.is_none());
    }

    #[test]
    fn flashback_shows_once_then_hides() {
        let mut sim = vulnerable();
        sim.state.distance = 999.9;
        sim.advance_progression(0.1);
        assert_eq!(sim.state().displays.flashback.map(|d| d.value), Some(1000));
        assert!(sim.drain_events().contains(&GameEvent::Flashback(1000)));

        sim.advance_progression(0.1);
        assert!(!sim.drain_events().contains(&GameEvent::Flashback(1000)));

        // Keep hazards spawned meanwhile from ending the run
        sim.state.abilities.invincibility = 10.0;
        for _ in 0..36 {
            sim.frame(0.1);
        }
        assert!(sim.state().displays.flashback.is_none());
    }

    #[test]
    fn belly_slide_adds_speed() {
        let mut sim = vulnerable();
        sim.belly_slide_start();
        sim.advance_progression(0.0);
        let expected = sim.tuning().start_speed + sim.tuning().belly_slide_speed_bonus;
        assert!((sim.state().forward_speed - expected).abs() < 1e-6);
    }

    #[test]
    fn fish_collection_scores_and_chains() {
        let mut sim = vulnerable();
        sim.spawn_collectible(CollectibleKind::Fish, Lane::Center, 0.0, HeightTier::Ground);
        sim.run_collision_pass();
        assert_eq!(sim.state().score, 10);
        assert_eq!(sim.state().abilities.combo.count, 1);
        assert_eq!(sim.state().fish_collected, 1);
        assert!(sim.state().collectibles[0].collected);

        // Same fish is not counted twice
        sim.run_collision_pass();
        assert_eq!(sim.state().score, 10);
    }

    #[test]
    fn collected_fish_fade_out() {
        let mut sim = vulnerable();
        let id = sim.spawn_collectible(CollectibleKind::Fish, Lane::Center, 0.0, HeightTier::Ground);
        sim.run_collision_pass();
        for _ in 0..5 {
            sim.frame(0.1);
        }
        // The spawner keeps adding fish upstream; only the eaten one must go
        assert!(!sim.state().collectibles.iter().any(|c| c.id == id));
    }

    #[test]
    fn golden_fish_triggers_everything() {
        let mut sim = vulnerable();
        sim.spawn_collectible(
            CollectibleKind::GoldenFish { memory: 1 },
            Lane::Center,
            0.0,
            HeightTier::Ground,
        );
        sim.run_collision_pass();
        let state = sim.state();
        assert_eq!(state.score, 50);
        assert!(state.abilities.is_slow_motion());
        assert!(state.abilities.is_invincible());
        assert_eq!(state.displays.memory.map(|d| d.value), Some(1));
        let events = sim.drain_events();
        assert!(events.contains(&GameEvent::MemoryFragment(1)));
        assert!(events.contains(&GameEvent::FishCollected {
            points: 50,
            combo: 1,
            golden: true
        }));
    }

    #[test]
    fn repeated_memory_is_not_announced_again() {
        let mut sim = vulnerable();
        sim.state.spawner.mark_memory(2);
        sim.spawn_collectible(
            CollectibleKind::GoldenFish { memory: 2 },
            Lane::Center,
            0.0,
            HeightTier::Ground,
        );
        sim.run_collision_pass();
        assert!(!sim.drain_events().contains(&GameEvent::MemoryFragment(2)));
    }

    #[test]
    fn ice_patch_starts_slip() {
        let mut sim = vulnerable();
        sim.spawn_hazard(HazardKind::IcePatch, Lane::Center, 0.0);
        sim.run_collision_pass();
        assert!(sim.state().player.is_slipping());
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.drain_events(), vec![GameEvent::SlipStarted]);
    }

    #[test]
    fn water_zone_is_edge_triggered() {
        let mut sim = vulnerable();
        let id = sim.spawn_hazard(HazardKind::Water, Lane::Center, 0.0);
        sim.run_collision_pass();
        assert_eq!(sim.state().player.mode, VerticalMode::Swimming);
        sim.run_collision_pass();
        sim.state.hazards.retain(|h| h.id != id);
        sim.run_collision_pass();
        assert_eq!(sim.state().player.mode, VerticalMode::Standing);
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::SwimStarted, GameEvent::SwimEnded]
        );
    }

    #[test]
    fn terminal_hit_removes_hazard_and_ends_run() {
        let mut sim = vulnerable();
        sim.spawn_hazard(HazardKind::Fox, Lane::Center, 0.0);
        sim.run_collision_pass();
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(sim.state().hazards.is_empty());
        assert!(sim.last_run().is_some());
    }

    #[test]
    fn outcomes_before_terminal_still_apply() {
        let mut sim = vulnerable();
        sim.spawn_hazard(HazardKind::IcePatch, Lane::Center, 0.5);
        sim.spawn_hazard(HazardKind::Rock, Lane::Center, 0.0);
        sim.run_collision_pass();
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(sim.state().player.is_slipping());
    }

    #[test]
    fn hazards_despawn_behind_player() {
        let mut sim = vulnerable();
        sim.state.abilities.invincibility = 100.0;
        sim.spawn_hazard(HazardKind::Rock, Lane::Left, 9.9);
        sim.frame(0.1);
        assert!(sim.state().hazards.iter().all(|h| h.position < DESPAWN_OFFSET));
        assert!(!sim.state().hazards.iter().any(|h| h.lane == Lane::Left && h.position > 9.0));
    }

    #[test]
    fn long_run_keeps_invariants() {
        let mut sim = Simulation::new(99);
        sim.start_game();
        sim.state.abilities.invincibility = 1.0e6;
        for i in 0..20_000 {
            match i % 97 {
                0 => sim.move_left(),
                31 => sim.jump(),
                50 => sim.move_right(),
                70 => sim.belly_slide_start(),
                90 => sim.belly_slide_end(),
                _ => {}
            }
            sim.frame(1.0 / 60.0);
            assert_eq!(sim.state().check_invariants(sim.tuning()), Ok(()));
        }
        assert!(sim.state().distance > 1000.0);
        assert!(!sim.state().hazards.is_empty());
    }
}
