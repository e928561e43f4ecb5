//! Distance, speed and environment progression
//!
//! Biome is a pure step function of distance. Weather and time of day run on
//! their own clocks, orthogonal to biome. Milestones and speed ratchets fire
//! once per threshold crossed, whatever the frame rate.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Distance-indexed environment/difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    IcePlains,
    Ocean,
    Cliffs,
    Mountain,
    Peaks,
}

impl Biome {
    pub const ALL: [Biome; 5] = [
        Biome::IcePlains,
        Biome::Ocean,
        Biome::Cliffs,
        Biome::Mountain,
        Biome::Peaks,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Distance at which this biome begins
    pub fn start_distance(self) -> f32 {
        match self {
            Biome::IcePlains => 0.0,
            Biome::Ocean => 1000.0,
            Biome::Cliffs => 2000.0,
            Biome::Mountain => 3000.0,
            Biome::Peaks => 4000.0,
        }
    }

    /// Spawn-rate multiplier (higher = denser hazards)
    pub fn difficulty(self) -> f32 {
        match self {
            Biome::IcePlains => 1.0,
            Biome::Ocean => 1.1,
            Biome::Cliffs => 1.2,
            Biome::Mountain => 1.35,
            Biome::Peaks => 1.5,
        }
    }

    /// Stable identifier used by leaderboards and share links
    pub fn as_str(self) -> &'static str {
        match self {
            Biome::IcePlains => "ice_plains",
            Biome::Ocean => "ocean",
            Biome::Cliffs => "cliffs",
            Biome::Mountain => "mountain",
            Biome::Peaks => "peaks",
        }
    }
}

/// Biome for a given distance (non-finite or negative distances map to the first)
pub fn biome_for_distance(distance: f32) -> Biome {
    Biome::ALL
        .iter()
        .rev()
        .copied()
        .find(|biome| distance >= biome.start_distance())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    LightSnow,
    Blizzard,
    Foggy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Clear,
        Weather::LightSnow,
        Weather::Blizzard,
        Weather::Foggy,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeOfDay {
    Dawn,
    #[default]
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub const CYCLE: [TimeOfDay; 4] = [
        TimeOfDay::Dawn,
        TimeOfDay::Day,
        TimeOfDay::Dusk,
        TimeOfDay::Night,
    ];
}

/// Phase of the day cycle `clock` seconds into a run (runs start at Day)
pub fn time_of_day_at(clock: f32, period: f32) -> TimeOfDay {
    let quarter = period / 4.0;
    let steps = (clock.max(0.0) / quarter).floor() as usize;
    TimeOfDay::CYCLE[(1 + steps) % TimeOfDay::CYCLE.len()]
}

/// Mood of the penguin's inner monologue, darkening with distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThoughtTier {
    Early,
    Mid,
    Late,
    Existential,
}

impl ThoughtTier {
    pub fn for_distance(distance: f32) -> Self {
        if distance < 2000.0 {
            ThoughtTier::Early
        } else if distance < 5000.0 {
            ThoughtTier::Mid
        } else if distance < 10000.0 {
            ThoughtTier::Late
        } else {
            ThoughtTier::Existential
        }
    }
}

/// Distance of the first thought
const FIRST_THOUGHT: f32 = 600.0;
/// Thoughts recur every 550-800 units
const THOUGHT_GAP_MIN: f32 = 550.0;
const THOUGHT_GAP_SPREAD: f32 = 250.0;

/// Distances that replay a flashback, each once per run
pub const FLASHBACK_DISTANCES: [u32; 4] = [1000, 3000, 5000, 10000];

/// Forward speed from base speed and active modifiers, clamped to the ceiling
pub fn forward_speed(
    base_speed: f32,
    distance: f32,
    belly_sliding: bool,
    boosted: bool,
    tuning: &Tuning,
) -> f32 {
    let ramp = (distance * tuning.distance_ramp).min(tuning.distance_ramp_max);
    let belly = if belly_sliding {
        tuning.belly_slide_speed_bonus
    } else {
        0.0
    };
    let boost = if boosted { tuning.combo_speed_boost } else { 0.0 };
    (base_speed + ramp + belly + boost).min(tuning.max_speed)
}

/// Progression bookkeeping carried between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Cached view of `biome_for_distance(distance)`
    pub biome: Biome,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    /// Seconds since the last weather change
    pub weather_timer: f32,
    /// Seconds into the day cycle
    pub clock: f32,
    /// Highest milestone distance already announced
    pub last_milestone: u32,
    /// Base speed ratchets already applied
    pub speed_steps: u32,
    /// Distance at which the next thought surfaces
    pub next_thought: f32,
    /// Flashbacks already shown this run
    pub flashbacks_seen: usize,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            biome: Biome::IcePlains,
            weather: Weather::Clear,
            time_of_day: TimeOfDay::Day,
            weather_timer: 0.0,
            clock: 0.0,
            last_milestone: 0,
            speed_steps: 0,
            next_thought: FIRST_THOUGHT,
            flashbacks_seen: 0,
        }
    }
}

impl Progression {
    /// Refresh the cached biome. Returns the new biome on change.
    pub fn update_biome(&mut self, distance: f32) -> Option<Biome> {
        let biome = biome_for_distance(distance);
        if biome == self.biome {
            return None;
        }
        self.biome = biome;
        Some(biome)
    }

    /// Advance the weather clock, rolling a different category each interval
    pub fn advance_weather<R: Rng>(&mut self, dt: f32, tuning: &Tuning, rng: &mut R) -> Option<Weather> {
        self.weather_timer += dt;
        if self.weather_timer < tuning.weather_interval {
            return None;
        }
        self.weather_timer -= tuning.weather_interval;

        let choices: Vec<Weather> = Weather::ALL
            .iter()
            .copied()
            .filter(|w| *w != self.weather)
            .collect();
        self.weather = choices[rng.random_range(0..choices.len())];
        Some(self.weather)
    }

    /// Advance the day cycle. Returns the new phase on change.
    pub fn advance_clock(&mut self, dt: f32, tuning: &Tuning) -> Option<TimeOfDay> {
        self.clock = (self.clock + dt) % tuning.day_period;
        let phase = time_of_day_at(self.clock, tuning.day_period);
        if phase == self.time_of_day {
            return None;
        }
        self.time_of_day = phase;
        Some(phase)
    }

    /// Milestones newly crossed, in ascending order
    pub fn take_milestones(&mut self, distance: f32, tuning: &Tuning) -> Vec<u32> {
        let interval = tuning.milestone_interval;
        let reached = ((distance / interval).floor() * interval) as u32;
        let step = interval as u32;
        if step == 0 || reached <= self.last_milestone {
            return Vec::new();
        }
        let crossed: Vec<u32> = (self.last_milestone + step..=reached)
            .step_by(step as usize)
            .collect();
        self.last_milestone = reached;
        crossed
    }

    /// Number of base speed ratchets owed for the distance covered
    pub fn take_speed_steps(&mut self, distance: f32, tuning: &Tuning) -> u32 {
        let due = (distance / tuning.speed_step_interval).floor() as u32;
        let owed = due.saturating_sub(self.speed_steps);
        self.speed_steps = self.speed_steps.max(due);
        owed
    }

    /// Surface a thought once the scheduled distance is reached
    pub fn take_thought<R: Rng>(&mut self, distance: f32, rng: &mut R) -> Option<ThoughtTier> {
        if distance < self.next_thought {
            return None;
        }
        self.next_thought = distance + THOUGHT_GAP_MIN + rng.random::<f32>() * THOUGHT_GAP_SPREAD;
        Some(ThoughtTier::for_distance(distance))
    }

    /// Next flashback distance reached, at most one per call
    pub fn take_flashback(&mut self, distance: f32) -> Option<u32> {
        let at = *FLASHBACK_DISTANCES.get(self.flashbacks_seen)?;
        if distance < at as f32 {
            return None;
        }
        self.flashbacks_seen += 1;
        Some(at)
    }
}
