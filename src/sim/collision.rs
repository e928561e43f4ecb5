//! Collision detection between the penguin and track entities
//!
//! Detection is a pure read of the state and produces a report; the
//! controller applies the report afterwards. Keeping the two phases apart
//! means a pass never observes its own side effects.

use super::hitbox::{Aabb, OutcomePolicy, is_terminal};
use super::state::{CollectibleKind, HazardKind, SimulationState, VerticalMode};
use crate::consts::COLLISION_BAND;

/// Non-terminal effect found during a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Touched an ice patch
    Slip { hazard_id: u32 },
    /// Picked up a fish
    Collect { collectible_id: u32, kind: CollectibleKind },
}

/// Hazard that ends the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terminal {
    pub hazard_id: u32,
    pub kind: HazardKind,
}

/// Result of one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Effects gathered before any terminal contact, in entity order
    pub outcomes: Vec<Outcome>,
    /// Whether the penguin overlaps a water zone this pass
    pub in_water: bool,
    pub terminal: Option<Terminal>,
}

impl CollisionReport {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Test every nearby entity against the penguin's hitbox
///
/// `sweep` is how far entities moved this tick; their boxes are stretched
/// back over that distance so a fast frame cannot skip past a hazard.
pub fn detect(state: &SimulationState, sweep: f32) -> CollisionReport {
    let mut report = CollisionReport::clear();
    let player = &state.player;
    let player_box = player.hitbox();
    let invincible = state.abilities.is_invincible();

    for hazard in &state.hazards {
        if !in_band(hazard.position, hazard.kind.collision_band(), sweep) {
            continue;
        }
        if !player_box.overlaps(&hazard.hitbox().swept_back(sweep)) {
            continue;
        }

        match hazard.kind.policy() {
            OutcomePolicy::Swim => report.in_water = true,
            OutcomePolicy::Slip => {
                if !player.is_slipping() && player.mode != VerticalMode::Jumping {
                    report.outcomes.push(Outcome::Slip {
                        hazard_id: hazard.id,
                    });
                }
            }
            OutcomePolicy::Chasm | OutcomePolicy::JumpOrSlide | OutcomePolicy::MustJump => {
                if invincible || !is_terminal(hazard, player.mode) {
                    continue;
                }
                report.terminal = Some(Terminal {
                    hazard_id: hazard.id,
                    kind: hazard.kind,
                });
                return report;
            }
        }
    }

    for collectible in &state.collectibles {
        if collectible.collected || !in_band(collectible.position, COLLISION_BAND, sweep) {
            continue;
        }
        let fish_box: Aabb = collectible.hitbox().swept_back(sweep);
        if player_box.overlaps(&fish_box) {
            report.outcomes.push(Outcome::Collect {
                collectible_id: collectible.id,
                kind: collectible.kind,
            });
        }
    }

    report
}

fn in_band(position: f32, band: f32, sweep: f32) -> bool {
    position > -band && position - sweep.max(0.0) < band
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Collectible, Hazard, HeightTier, Lane};
    use crate::tuning::Tuning;

    fn state() -> SimulationState {
        SimulationState::new(1, &Tuning::default())
    }

    fn add_hazard(state: &mut SimulationState, kind: HazardKind, lane: Lane, position: f32) -> u32 {
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            lane,
            kind,
            position,
            rotation: 0.0,
            scale: 1.0,
        });
        id
    }

    fn add_fish(state: &mut SimulationState, lane: Lane, position: f32) -> u32 {
        let id = state.next_entity_id();
        state.collectibles.push(Collectible {
            id,
            lane,
            kind: CollectibleKind::Fish,
            position,
            height: HeightTier::Ground,
            collected: false,
            fade: 0.0,
        });
        id
    }

    #[test]
    fn empty_track_is_clear() {
        assert_eq!(detect(&state(), 0.0), CollisionReport::clear());
    }

    #[test]
    fn seal_in_lane_is_terminal() {
        let mut state = state();
        let id = add_hazard(&mut state, HazardKind::Seal, Lane::Center, 0.0);
        let report = detect(&state, 0.0);
        assert_eq!(
            report.terminal,
            Some(Terminal {
                hazard_id: id,
                kind: HazardKind::Seal
            })
        );
    }

    #[test]
    fn far_hazards_are_ignored() {
        let mut state = state();
        add_hazard(&mut state, HazardKind::Seal, Lane::Center, -20.0);
        add_hazard(&mut state, HazardKind::Rock, Lane::Left, 0.0);
        assert!(!detect(&state, 0.0).is_terminal());
    }

    #[test]
    fn invincibility_suppresses_terminals() {
        let mut state = state();
        state.abilities.invincibility = 1.0;
        for kind in HazardKind::ALL {
            add_hazard(&mut state, kind, Lane::Center, 0.0);
        }
        assert!(!detect(&state, 0.0).is_terminal());
    }

    #[test]
    fn jumping_clears_a_chasm() {
        let mut state = state();
        add_hazard(&mut state, HazardKind::LargeCrevasse, Lane::Center, 0.0);
        state.player.mode = VerticalMode::Jumping;
        assert!(!detect(&state, 0.0).is_terminal());
        state.player.mode = VerticalMode::Standing;
        assert!(detect(&state, 0.0).is_terminal());
    }

    #[test]
    fn terminal_stops_the_pass() {
        let mut state = state();
        add_hazard(&mut state, HazardKind::IcePatch, Lane::Center, 0.5);
        add_hazard(&mut state, HazardKind::Rock, Lane::Center, 0.0);
        add_fish(&mut state, Lane::Center, 0.0);
        let report = detect(&state, 0.0);
        assert!(report.is_terminal());
        // The slip found first survives; the fish after the terminal is never reached
        assert_eq!(report.outcomes.len(), 1);
        assert!(matches!(report.outcomes[0], Outcome::Slip { .. }));
    }

    #[test]
    fn water_sets_the_zone_flag() {
        let mut state = state();
        add_hazard(&mut state, HazardKind::Water, Lane::Center, 2.5);
        assert!(detect(&state, 0.0).in_water);
        state.player.lane = Lane::Right;
        assert!(!detect(&state, 0.0).in_water);
    }

    #[test]
    fn slip_skipped_while_already_slipping() {
        let tuning = Tuning::default();
        let mut state = state();
        add_hazard(&mut state, HazardKind::IcePatch, Lane::Center, 0.0);
        assert_eq!(detect(&state, 0.0).outcomes.len(), 1);
        state.player.set_slipping(true, &tuning);
        assert!(detect(&state, 0.0).outcomes.is_empty());
    }

    #[test]
    fn collected_fish_are_not_recollected() {
        let mut state = state();
        let id = add_fish(&mut state, Lane::Center, 0.2);
        let report = detect(&state, 0.0);
        assert_eq!(
            report.outcomes,
            vec![Outcome::Collect {
                collectible_id: id,
                kind: CollectibleKind::Fish
            }]
        );
        state.collectibles[0].collected = true;
        assert!(detect(&state, 0.0).outcomes.is_empty());
    }

    #[test]
    fn sweep_catches_hazard_that_jumped_the_band() {
        let mut state = state();
        // Moved from -2.0 to 2.0 within one tick
        add_hazard(&mut state, HazardKind::Fox, Lane::Center, 2.0);
        assert!(!detect(&state, 0.0).is_terminal());
        assert!(detect(&state, 4.0).is_terminal());
    }
}
