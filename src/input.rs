//! Keyboard and touch mapping onto simulation commands
//!
//! Keys: arrows / WASD steer, jump and slide, space jumps, Shift holds a
//! belly slide. Touch: a swipe of at least 30 px along its dominant axis
//! steers, jumps (up) or slides (down); a finger held still starts a belly
//! slide that lasts until it lifts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Everything a player can ask the penguin to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Jump,
    SlideStart,
    SlideEnd,
    BellySlideStart,
    BellySlideEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Minimum swipe length in CSS pixels
pub const SWIPE_THRESHOLD: f32 = 30.0;
/// Seconds a still finger must rest before a belly slide starts
pub const HOLD_THRESHOLD: f32 = 0.35;

/// Map a DOM `KeyboardEvent.key` value
pub fn command_for_key(key: &str, phase: KeyPhase) -> Option<Command> {
    match phase {
        KeyPhase::Down => match key {
            "ArrowLeft" | "a" | "A" => Some(Command::MoveLeft),
            "ArrowRight" | "d" | "D" => Some(Command::MoveRight),
            "ArrowUp" | "w" | "W" | " " => Some(Command::Jump),
            "ArrowDown" | "s" | "S" => Some(Command::SlideStart),
            "Shift" => Some(Command::BellySlideStart),
            _ => None,
        },
        KeyPhase::Up => match key {
            "Shift" => Some(Command::BellySlideEnd),
            _ => None,
        },
    }
}

/// Classify a finished swipe by its dominant axis (screen y grows downward)
pub fn classify_swipe(delta: Vec2) -> Option<Command> {
    if delta.x.abs() > delta.y.abs() {
        if delta.x > SWIPE_THRESHOLD {
            Some(Command::MoveRight)
        } else if delta.x < -SWIPE_THRESHOLD {
            Some(Command::MoveLeft)
        } else {
            None
        }
    } else if delta.y < -SWIPE_THRESHOLD {
        Some(Command::Jump)
    } else if delta.y > SWIPE_THRESHOLD {
        Some(Command::SlideStart)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTouch {
    start: Vec2,
    last: Vec2,
    held: f32,
    belly_sliding: bool,
}

/// Follows a single finger from touchstart to touchend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchTracker {
    touch: Option<ActiveTouch>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.touch.is_some()
    }

    /// Finger down. A second finger restarts tracking.
    pub fn start(&mut self, x: f32, y: f32) {
        let at = Vec2::new(x, y);
        self.touch = Some(ActiveTouch {
            start: at,
            last: at,
            held: 0.0,
            belly_sliding: false,
        });
    }

    pub fn moved(&mut self, x: f32, y: f32) {
        if let Some(touch) = &mut self.touch {
            touch.last = Vec2::new(x, y);
        }
    }

    /// Count hold time; a still finger turns into a belly slide once
    pub fn advance(&mut self, dt: f32) -> Option<Command> {
        let touch = self.touch.as_mut()?;
        if touch.belly_sliding {
            return None;
        }
        if touch.last.distance(touch.start) >= SWIPE_THRESHOLD {
            return None;
        }
        touch.held += dt;
        if touch.held < HOLD_THRESHOLD {
            return None;
        }
        touch.belly_sliding = true;
        Some(Command::BellySlideStart)
    }

    /// Finger up: release a belly slide, or read the gesture as a swipe
    pub fn end(&mut self, x: f32, y: f32) -> Option<Command> {
        let touch = self.touch.take()?;
        if touch.belly_sliding {
            return Some(Command::BellySlideEnd);
        }
        classify_swipe(Vec2::new(x, y) - touch.start)
    }

    /// Touch cancelled by the browser
    pub fn cancel(&mut self) -> Option<Command> {
        let touch = self.touch.take()?;
        touch.belly_sliding.then_some(Command::BellySlideEnd)
    }
}
