//! Data-driven game balance
//!
//! Every number a designer might want to tweak lives here. The defaults are
//! the shipped balance; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a balance file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Base speed at run start (units per 60 Hz frame)
    pub start_speed: f32,
    /// Hard ceiling for forward speed
    pub max_speed: f32,
    /// Base speed ratchet applied every `speed_step_interval` units
    pub speed_step: f32,
    pub speed_step_interval: f32,
    /// Continuous ramp: extra speed per unit of distance, capped
    pub distance_ramp: f32,
    pub distance_ramp_max: f32,

    // === Locomotion ===
    /// Jump progress per second (arc completes at 1.0)
    pub jump_rate: f32,
    /// Tap slide duration (seconds)
    pub slide_duration: f32,
    /// Slip duration after touching an ice patch (seconds)
    pub slip_duration: f32,

    // === Belly slide ===
    pub belly_slide_max_energy: f32,
    /// Energy drained per second while belly-sliding
    pub belly_slide_drain: f32,
    /// Energy regenerated per second while idle and off cooldown
    pub belly_slide_regen: f32,
    /// Cooldown imposed when a belly slide ends nearly empty
    pub belly_slide_cooldown: f32,
    /// Ending below this energy triggers the cooldown
    pub belly_slide_cooldown_threshold: f32,
    pub belly_slide_speed_bonus: f32,

    // === Combo ===
    /// Seconds before an idle combo resets
    pub combo_window: f32,
    /// Extra forward speed while a combo speed boost is active
    pub combo_speed_boost: f32,
    pub speed_boost_duration: f32,

    // === Protection / slow motion ===
    pub start_invincibility: f32,
    pub special_invincibility: f32,
    pub slow_motion_duration: f32,
    /// Simulation time scale while slow motion is active
    pub slow_motion_factor: f32,

    // === Spawning ===
    pub hazard_interval_base: f32,
    pub hazard_interval_min: f32,
    pub fish_interval: f32,
    pub pattern_chance: f32,
    /// Seconds of sim time between golden fish rolls
    pub special_check_interval: f32,
    pub special_chance: f32,
    /// Chance that a fish past 500 units floats at jump height
    pub high_fish_chance: f32,

    // === Progression ===
    pub milestone_interval: f32,
    pub milestone_display: f32,
    pub weather_interval: f32,
    /// Full dawn/day/dusk/night cycle length (seconds)
    pub day_period: f32,
    pub thought_display: f32,
    pub memory_display: f32,
    pub flashback_display: f32,

    /// Read-only flag for debug overlays in the UI layer
    pub debug: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_speed: 0.3,
            max_speed: 0.8,
            speed_step: 0.01,
            speed_step_interval: 500.0,
            distance_ramp: 0.000_02,
            distance_ramp_max: 0.1,

            jump_rate: 3.0,
            slide_duration: 0.5,
            slip_duration: 1.5,

            belly_slide_max_energy: 3.0,
            belly_slide_drain: 1.0,
            belly_slide_regen: 0.5,
            belly_slide_cooldown: 3.0,
            belly_slide_cooldown_threshold: 0.5,
            belly_slide_speed_bonus: 0.1,

            combo_window: 2.0,
            combo_speed_boost: 0.05,
            speed_boost_duration: 3.0,

            start_invincibility: 2.0,
            special_invincibility: 1.0,
            slow_motion_duration: 2.0,
            slow_motion_factor: 0.3,

            hazard_interval_base: 18.0,
            hazard_interval_min: 6.0,
            fish_interval: 8.0,
            pattern_chance: 0.08,
            special_check_interval: 2.4,
            special_chance: 0.03,
            high_fish_chance: 0.2,

            milestone_interval: 500.0,
            milestone_display: 3.0,
            weather_interval: 30.0,
            day_period: 240.0,
            thought_display: 4.0,
            memory_display: 5.0,
            flashback_display: 3.5,

            debug: false,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) balance document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("start_speed", self.start_speed),
            ("max_speed", self.max_speed),
            ("speed_step_interval", self.speed_step_interval),
            ("jump_rate", self.jump_rate),
            ("slide_duration", self.slide_duration),
            ("slip_duration", self.slip_duration),
            ("belly_slide_max_energy", self.belly_slide_max_energy),
            ("belly_slide_drain", self.belly_slide_drain),
            ("combo_window", self.combo_window),
            ("hazard_interval_min", self.hazard_interval_min),
            ("fish_interval", self.fish_interval),
            ("special_check_interval", self.special_check_interval),
            ("milestone_interval", self.milestone_interval),
            ("weather_interval", self.weather_interval),
            ("day_period", self.day_period),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange {
                    field,
                    expected: "positive",
                    value,
                });
            }
        }

        let probabilities = [
            ("pattern_chance", self.pattern_chance),
            ("special_chance", self.special_chance),
            ("high_fish_chance", self.high_fish_chance),
            ("slow_motion_factor", self.slow_motion_factor),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange {
                    field,
                    expected: "within [0, 1]",
                    value,
                });
            }
        }

        let non_negative = [
            ("speed_step", self.speed_step),
            ("distance_ramp", self.distance_ramp),
            ("distance_ramp_max", self.distance_ramp_max),
            ("belly_slide_regen", self.belly_slide_regen),
            ("belly_slide_cooldown", self.belly_slide_cooldown),
            ("belly_slide_cooldown_threshold", self.belly_slide_cooldown_threshold),
            ("belly_slide_speed_bonus", self.belly_slide_speed_bonus),
            ("combo_speed_boost", self.combo_speed_boost),
            ("speed_boost_duration", self.speed_boost_duration),
            ("start_invincibility", self.start_invincibility),
            ("special_invincibility", self.special_invincibility),
            ("slow_motion_duration", self.slow_motion_duration),
            ("milestone_display", self.milestone_display),
            ("thought_display", self.thought_display),
            ("memory_display", self.memory_display),
            ("flashback_display", self.flashback_display),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::OutOfRange {
                    field,
                    expected: "non-negative",
                    value,
                });
            }
        }

        // Milestones are counted in whole units
        if self.milestone_interval < 1.0 {
            return Err(TuningError::OutOfRange {
                field: "milestone_interval",
                expected: "at least 1",
                value: self.milestone_interval,
            });
        }
        if self.start_speed > self.max_speed {
            return Err(TuningError::OutOfRange {
                field: "start_speed",
                expected: "at most max_speed",
                value: self.start_speed,
            });
        }
        if self.hazard_interval_base < self.hazard_interval_min {
            return Err(TuningError::OutOfRange {
                field: "hazard_interval_base",
                expected: "at least hazard_interval_min",
                value: self.hazard_interval_base,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_speed": 1.2, "debug": true }"#).unwrap();
        assert_eq!(tuning.max_speed, 1.2);
        assert!(tuning.debug);
        assert_eq!(tuning.start_speed, Tuning::default().start_speed);
    }

    #[test]
    fn rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "special_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "special_chance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_start_above_max() {
        let err = Tuning::from_json(r#"{ "start_speed": 0.9, "max_speed": 0.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { field: "start_speed", .. }));
    }

    #[test]
    fn rejects_negative_rates_and_durations() {
        let fields = [
            "speed_step",
            "distance_ramp",
            "distance_ramp_max",
            "belly_slide_regen",
            "belly_slide_cooldown",
            "belly_slide_cooldown_threshold",
            "belly_slide_speed_bonus",
            "combo_speed_boost",
            "speed_boost_duration",
            "start_invincibility",
            "special_invincibility",
            "slow_motion_duration",
            "milestone_display",
            "thought_display",
            "memory_display",
            "flashback_display",
        ];
        for name in fields {
            let json = format!(r#"{{ "{name}": -1.0 }}"#);
            match Tuning::from_json(&json) {
                Err(TuningError::OutOfRange { field, value, .. }) => {
                    assert_eq!(field, name);
                    assert_eq!(value, -1.0);
                }
                other => panic!("{name} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn zero_rates_are_allowed() {
        let tuning = Tuning::from_json(r#"{ "belly_slide_regen": 0.0, "distance_ramp": 0.0 }"#).unwrap();
        assert_eq!(tuning.belly_slide_regen, 0.0);
    }

    #[test]
    fn rejects_fractional_milestone_interval() {
        let err = Tuning::from_json(r#"{ "milestone_interval": 0.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "milestone_interval",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "milestone_interval": 1.0 }"#).is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
