//! Player locomotion state machine
//!
//! Every transition is guarded: a command issued in the wrong state is
//! silently dropped. Methods return whether the command took effect so the
//! controller can log rejections; callers outside the simulation never see
//! an error.

use super::abilities::BellySlide;
use super::state::{Player, Slip, VerticalMode};
use crate::consts::SLIP_FREQUENCY;
use crate::tuning::Tuning;

impl Player {
    /// Shift one lane left. Ignored while slipping.
    pub fn move_left(&mut self) -> bool {
        if self.is_slipping() {
            return false;
        }
        let next = self.lane.left();
        let moved = next != self.lane;
        self.lane = next;
        moved
    }

    /// Shift one lane right. Ignored while slipping.
    pub fn move_right(&mut self) -> bool {
        if self.is_slipping() {
            return false;
        }
        let next = self.lane.right();
        let moved = next != self.lane;
        self.lane = next;
        moved
    }

    /// Start a jump arc. Only possible from Standing.
    pub fn jump(&mut self) -> bool {
        if self.mode != VerticalMode::Standing {
            return false;
        }
        self.mode = VerticalMode::Jumping;
        self.jump_progress = 0.0;
        true
    }

    /// Tap slide from Standing; tapping again mid-slide refreshes the timer
    pub fn slide_start(&mut self, tuning: &Tuning) -> bool {
        match self.mode {
            VerticalMode::Standing | VerticalMode::Sliding => {
                self.mode = VerticalMode::Sliding;
                self.slide_timer = tuning.slide_duration;
                true
            }
            _ => false,
        }
    }

    /// Cut a tap slide short
    pub fn slide_end(&mut self) -> bool {
        if self.mode != VerticalMode::Sliding {
            return false;
        }
        self.mode = VerticalMode::Standing;
        self.slide_timer = 0.0;
        true
    }

    /// Begin a held belly slide if the meter allows it
    pub fn belly_slide_start(&mut self, belly: &BellySlide) -> bool {
        let blocked = matches!(
            self.mode,
            VerticalMode::Jumping | VerticalMode::Swimming | VerticalMode::BellySliding
        );
        if blocked || !belly.can_start() {
            return false;
        }
        self.mode = VerticalMode::BellySliding;
        self.slide_timer = 0.0;
        true
    }

    /// Release a belly slide, applying the cooldown rule
    pub fn belly_slide_end(&mut self, belly: &mut BellySlide, tuning: &Tuning) -> bool {
        if self.mode != VerticalMode::BellySliding {
            return false;
        }
        self.mode = VerticalMode::Standing;
        belly.finish(tuning);
        true
    }

    /// Enter or leave water. Airborne penguins skim over it.
    pub fn set_swimming(&mut self, swimming: bool, belly: &mut BellySlide, tuning: &Tuning) -> bool {
        if !swimming {
            if self.mode != VerticalMode::Swimming {
                return false;
            }
            self.mode = VerticalMode::Standing;
            return true;
        }

        match self.mode {
            VerticalMode::Swimming | VerticalMode::Jumping => false,
            VerticalMode::BellySliding => {
                belly.finish(tuning);
                self.mode = VerticalMode::Swimming;
                true
            }
            VerticalMode::Standing | VerticalMode::Sliding => {
                self.slide_timer = 0.0;
                self.mode = VerticalMode::Swimming;
                true
            }
        }
    }

    /// Start or clear a slip
    pub fn set_slipping(&mut self, slipping: bool, tuning: &Tuning) -> bool {
        match (slipping, self.slip.is_some()) {
            (true, false) => {
                self.slip = Some(Slip {
                    timer: tuning.slip_duration,
                    phase: 0.0,
                });
                true
            }
            (false, true) => {
                self.slip = None;
                true
            }
            _ => false,
        }
    }

    /// Advance the timed actions: jump arc, tap slide, slip wobble
    pub fn advance(&mut self, dt: f32, tuning: &Tuning) {
        match self.mode {
            VerticalMode::Jumping => {
                self.jump_progress += dt * tuning.jump_rate;
                if self.jump_progress >= 1.0 {
                    self.jump_progress = 0.0;
                    self.mode = VerticalMode::Standing;
                }
            }
            VerticalMode::Sliding => {
                self.slide_timer = (self.slide_timer - dt).max(0.0);
                if self.slide_timer <= 0.0 {
                    self.mode = VerticalMode::Standing;
                }
            }
            _ => {}
        }

        if let Some(slip) = &mut self.slip {
            slip.timer -= dt;
            slip.phase += dt * SLIP_FREQUENCY;
            if slip.timer <= 0.0 {
                self.slip = None;
            }
        }
    }
}
