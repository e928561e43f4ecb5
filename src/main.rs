//! Penguin Run entry point
//!
//! In the browser this wires DOM input to the simulation and drives it from
//! `requestAnimationFrame`; each frame's snapshot is published as a
//! `penguin-frame` CustomEvent for the rendering layer. Natively it runs a
//! headless autopilot demo and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit, KeyboardEvent, TouchEvent, Window};

    use penguin_run::web::WebGame;

    const HIGH_SCORE_KEY: &str = "penguin_run_high_score";
    /// First-frame dt (one 60 Hz frame)
    const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    struct App {
        game: WebGame,
        last_time: f64,
        saved_high_score: f64,
    }

    fn load_high_score(window: &Window) -> f64 {
        window
            .local_storage()
            .ok()
            .flatten()
            .and_then(|storage| storage.get_item(HIGH_SCORE_KEY).ok().flatten())
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    fn save_high_score(window: &Window, score: f64) {
        if let Some(storage) = window.local_storage().ok().flatten() {
            if storage.set_item(HIGH_SCORE_KEY, &score.to_string()).is_ok() {
                log::info!("High score saved ({score})");
            }
        }
    }

    fn publish(window: &Window, name: &str, json: &str) {
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(json));
        match CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Could not create {name} event: {e:?}"),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Penguin Run starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window available");
            return;
        };
        let high_score = load_high_score(&window);
        let app = Rc::new(RefCell::new(App {
            game: WebGame::new(high_score),
            last_time: 0.0,
            saved_high_score: high_score,
        }));

        setup_input_handlers(&window, app.clone());
        request_animation_frame(app);
        log::info!("Penguin Run running!");
    }

    /// Enter/space or a tap starts a run from the title or game-over screen
    fn start_if_idle(game: &mut WebGame) -> bool {
        if game.is_playing() {
            return false;
        }
        if game.is_game_over() {
            game.restart();
        } else {
            game.start();
        }
        true
    }

    fn setup_input_handlers(window: &Window, app: Rc<RefCell<App>>) {
        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                let key = event.key();
                let handled = if matches!(key.as_str(), "Enter" | " ") && start_if_idle(&mut a.game) {
                    true
                } else {
                    a.game.key_down(&key)
                };
                if handled {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().game.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut a = app.borrow_mut();
                if start_if_idle(&mut a.game) {
                    return;
                }
                if let Some(touch) = event.touches().get(0) {
                    a.game.touch_start(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = window.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    app.borrow_mut()
                        .game
                        .touch_move(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = window.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.changed_touches().get(0) {
                    app.borrow_mut()
                        .game
                        .touch_end(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = window.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                app.borrow_mut().game.touch_cancel();
            });
            let _ = window.add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        if let Some(window) = web_sys::window() {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DT
            };
            a.last_time = time;
            a.game.frame(dt);

            match a.game.drain_events_json() {
                Ok(events) if events != "[]" => publish(&window, "penguin-events", &events),
                Ok(_) => {}
                Err(e) => log::warn!("Event serialization failed: {e:?}"),
            }
            match a.game.snapshot_json() {
                Ok(snapshot) => publish(&window, "penguin-frame", &snapshot),
                Err(e) => log::warn!("Snapshot serialization failed: {e:?}"),
            }

            let high_score = a.game.high_score();
            if a.game.is_game_over() && high_score > a.saved_high_score {
                save_high_score(&window, high_score);
                a.saved_high_score = high_score;
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use penguin_run::Tuning;
    use penguin_run::consts::FRAME_RATE;
    use penguin_run::input::Command;
    use penguin_run::sim::{GamePhase, HazardKind, Lane, OutcomePolicy, Simulation};

    /// Seconds of play before the demo gives up
    const MAX_DEMO_SECONDS: f32 = 600.0;
    /// How far ahead the autopilot looks
    const LOOKAHEAD: f32 = 9.0;

    /// Nearest blocking hazard ahead in `lane`
    fn threat(sim: &Simulation, lane: Lane) -> Option<HazardKind> {
        sim.state()
            .hazards
            .iter()
            .filter(|h| h.lane == lane && h.position > -LOOKAHEAD && h.position < 1.0)
            .filter(|h| h.kind.policy() != OutcomePolicy::Slip)
            .max_by(|a, b| a.position.total_cmp(&b.position))
            .map(|h| h.kind)
    }

    /// Dodge sideways when a neighbor lane is clear, otherwise jump
    fn autopilot(sim: &Simulation) -> Option<Command> {
        let lane = sim.state().player.lane;
        let kind = threat(sim, lane)?;
        if lane != Lane::Left && threat(sim, lane.left()).is_none() {
            return Some(Command::MoveLeft);
        }
        if lane != Lane::Right && threat(sim, lane.right()).is_none() {
            return Some(Command::MoveRight);
        }
        match kind.policy() {
            OutcomePolicy::Swim => None,
            _ => Some(Command::Jump),
        }
    }

    pub fn run(seed: u64, tuning: Tuning) -> Result<(), penguin_run::TuningError> {
        let mut sim = Simulation::with_tuning(seed, tuning)?;
        sim.start_game();

        let dt = 1.0 / FRAME_RATE;
        let mut elapsed = 0.0;
        while sim.phase() == GamePhase::Playing && elapsed < MAX_DEMO_SECONDS {
            if let Some(command) = autopilot(&sim) {
                sim.apply(command);
            }
            sim.frame(dt);
            for event in sim.drain_events() {
                log::debug!("{event:?}");
            }
            elapsed += dt;
        }
        sim.end_game();

        if let Some(run) = sim.last_run() {
            println!(
                "distance {:.0} | score {} | max combo {} | fish {} | biome {}",
                run.distance,
                run.score,
                run.max_combo,
                run.fish_collected,
                run.biome_reached.as_str()
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Penguin Run (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play");

    // penguin-run [seed] [tuning.json]
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => 2024,
    };
    let tuning = match args.next() {
        Some(path) => penguin_run::Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => penguin_run::Tuning::default(),
    };

    demo::run(seed, tuning)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
