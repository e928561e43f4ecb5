//! Ability and resource meters
//!
//! Combo streak, belly-slide energy, and the countdowns for speed boost,
//! invincibility and slow motion. All timers are advanced by elapsed time,
//! never by wall-clock callbacks.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Combo tier size: every 5 consecutive pickups add half a multiplier
pub const COMBO_TIER: u32 = 5;

/// Belly energy below this counts as empty
const ENERGY_EPSILON: f32 = 1e-4;

/// Decaying collection streak
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    /// Seconds until the streak lapses
    pub timer: f32,
    pub max_this_run: u32,
}

impl Combo {
    /// Completed tiers (0 for counts below 5)
    pub fn tier(&self) -> u32 {
        self.count / COMBO_TIER
    }

    /// Score multiplier for the current streak
    pub fn multiplier(&self) -> f32 {
        1.0 + self.tier() as f32 * 0.5
    }

    /// Extend the streak. Returns true when a new tier was reached.
    pub fn add(&mut self, window: f32) -> bool {
        self.count += 1;
        self.timer = window;
        self.max_this_run = self.max_this_run.max(self.count);
        self.count % COMBO_TIER == 0
    }

    /// Decay the window. Returns true if the streak just lapsed.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.timer = (self.timer - dt).max(0.0);
        if self.timer > 0.0 || self.count == 0 {
            return false;
        }
        self.count = 0;
        true
    }
}

/// Points awarded for a pickup at the given streak
///
/// Integer form of `points * multiplier()`, halves rounded up.
pub fn combo_score(points: u32, combo: &Combo) -> u64 {
    let halves = 2 + combo.tier() as u64;
    (points as u64 * halves).div_ceil(2)
}

/// Energy meter behind the held belly slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BellySlide {
    pub energy: f32,
    /// Seconds until energy may regenerate and a new slide may start
    pub cooldown: f32,
}

impl BellySlide {
    pub fn full(tuning: &Tuning) -> Self {
        Self {
            energy: tuning.belly_slide_max_energy,
            cooldown: 0.0,
        }
    }

    pub fn can_start(&self) -> bool {
        self.cooldown <= 0.0 && self.energy > 0.0
    }

    /// Spend energy while sliding. Returns true once the meter is empty.
    pub fn drain(&mut self, dt: f32, tuning: &Tuning) -> bool {
        self.energy -= dt * tuning.belly_slide_drain;
        // Snap float residue left over from many small frames
        if self.energy <= ENERGY_EPSILON {
            self.energy = 0.0;
        }
        self.energy <= 0.0
    }

    /// Apply the end-of-slide cooldown rule
    pub fn finish(&mut self, tuning: &Tuning) {
        self.cooldown = if self.energy < tuning.belly_slide_cooldown_threshold {
            tuning.belly_slide_cooldown
        } else {
            0.0
        };
    }

    /// Tick the cooldown, then regenerate if it has elapsed
    pub fn recover(&mut self, dt: f32, tuning: &Tuning) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
            return;
        }
        self.energy = (self.energy + dt * tuning.belly_slide_regen).min(tuning.belly_slide_max_energy);
    }
}

/// All player resource meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abilities {
    pub combo: Combo,
    pub belly_slide: BellySlide,
    /// Seconds of terminal-collision immunity left
    pub invincibility: f32,
    /// Seconds of combo speed boost left
    pub speed_boost: f32,
    /// Real-time seconds of slow motion left
    pub slow_motion: f32,
}

impl Abilities {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            combo: Combo::default(),
            belly_slide: BellySlide::full(tuning),
            invincibility: 0.0,
            speed_boost: 0.0,
            slow_motion: 0.0,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    pub fn is_slow_motion(&self) -> bool {
        self.slow_motion > 0.0
    }

    /// Multiplier applied to simulation dt
    pub fn time_scale(&self, tuning: &Tuning) -> f32 {
        if self.is_slow_motion() {
            tuning.slow_motion_factor
        } else {
            1.0
        }
    }

    /// Arm invincibility, never shortening a longer window already running
    pub fn arm_invincibility(&mut self, duration: f32) {
        self.invincibility = self.invincibility.max(duration);
    }

    pub fn advance_invincibility(&mut self, dt: f32) {
        self.invincibility = (self.invincibility - dt).max(0.0);
    }

    pub fn advance_speed_boost(&mut self, dt: f32) {
        self.speed_boost = (self.speed_boost - dt).max(0.0);
    }

    /// Real-time countdown; returns true when slow motion just ended
    pub fn advance_slow_motion(&mut self, real_dt: f32) -> bool {
        if self.slow_motion <= 0.0 {
            return false;
        }
        self.slow_motion = (self.slow_motion - real_dt).max(0.0);
        self.slow_motion == 0.0
    }
}
