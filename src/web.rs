//! Browser bindings
//!
//! `WebGame` wraps one [`Simulation`] for a JS host: DOM input events go in,
//! JSON snapshots and event batches come out.

use wasm_bindgen::prelude::*;

use crate::input::{KeyPhase, TouchTracker, command_for_key};
use crate::sim::Simulation;

#[wasm_bindgen]
pub struct WebGame {
    sim: Simulation,
    touch: TouchTracker,
}

#[wasm_bindgen]
impl WebGame {
    /// New game on the title screen, seeded from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(high_score: f64) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        log::info!("WebGame created with seed {seed}");
        WebGame {
            sim: Simulation::new(seed).with_high_score(high_score.max(0.0) as u64),
            touch: TouchTracker::new(),
        }
    }

    pub fn start(&mut self) {
        self.sim.start_game();
    }

    pub fn restart(&mut self) {
        self.sim.reset_game();
    }

    pub fn title(&mut self) {
        self.sim.return_to_title();
    }

    /// `dt` in seconds since the previous animation frame
    pub fn frame(&mut self, dt: f32) {
        if let Some(command) = self.touch.advance(dt) {
            self.sim.apply(command);
        }
        self.sim.frame(dt);
    }

    /// Returns true if the key is bound (so the host can preventDefault)
    pub fn key_down(&mut self, key: &str) -> bool {
        self.key(key, KeyPhase::Down)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.key(key, KeyPhase::Up)
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.touch.start(x, y);
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        self.touch.moved(x, y);
    }

    pub fn touch_end(&mut self, x: f32, y: f32) {
        if let Some(command) = self.touch.end(x, y) {
            self.sim.apply(command);
        }
    }

    pub fn touch_cancel(&mut self) {
        if let Some(command) = self.touch.cancel() {
            self.sim.apply(command);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sim.state().is_playing()
    }

    pub fn is_game_over(&self) -> bool {
        self.sim.phase() == crate::sim::GamePhase::GameOver
    }

    pub fn high_score(&self) -> f64 {
        self.sim.state().high_score as f64
    }

    pub fn debug_mode(&self) -> bool {
        self.sim.debug_mode()
    }

    /// Current frame as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Events since the last call as a JSON array
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.drain_events()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Summary of the last finished run as JSON (`null` before the first)
    pub fn last_run_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.sim.last_run()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebGame {
    fn key(&mut self, key: &str, phase: KeyPhase) -> bool {
        match command_for_key(key, phase) {
            Some(command) => {
                self.sim.apply(command);
                true
            }
            None => false,
        }
    }
}
