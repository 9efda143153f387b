//! Arc Stop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

    use arc_stop::settings::Settings;
    use arc_stop::sim::{Controller, Mode, Phase, Snapshot, StopTrigger};
    use arc_stop::{needle_screen_rad, needle_tip};

    /// One-shot input flags set by DOM handlers, consumed once per frame
    #[derive(Debug, Clone, Default)]
    struct PendingInput {
        start: bool,
        stop: Option<StopTrigger>,
        toggle_mode: bool,
        reset: bool,
    }

    /// Game instance holding all state
    struct Game {
        controller: Controller,
        settings: Settings,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        size: (f64, f64),
        input: PendingInput,
        last_snapshot: Snapshot,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            let settings = Settings::load();
            let controller = Controller::new(settings.swing_config());
            let last_snapshot = controller.snapshot();
            Self {
                controller,
                settings,
                canvas,
                ctx,
                size: (0.0, 0.0),
                input: PendingInput::default(),
                last_snapshot,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Resize the backing store to match CSS size * devicePixelRatio
        fn sync_size(&mut self) {
            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            let w = (self.canvas.client_width() as f64 * dpr) as u32;
            let h = (self.canvas.client_height() as f64 * dpr) as u32;
            if w > 0 && h > 0 && (w, h) != (self.canvas.width(), self.canvas.height()) {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
            }
            self.size = (self.canvas.width() as f64, self.canvas.height() as f64);
        }

        /// Apply pending input and drive the deferred handover
        fn update(&mut self, time: f64) {
            if self.input.reset {
                self.last_snapshot = self.controller.reset(time);
            }
            if self.input.toggle_mode {
                self.last_snapshot = self.controller.toggle_mode(time);
            }
            if self.input.start {
                self.last_snapshot = self.controller.start(time);
            }
            if let Some(trigger) = self.input.stop {
                self.last_snapshot = self.controller.stop(trigger, time);
            }
            self.input = PendingInput::default();

            self.last_snapshot = self.controller.tick(time);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60_000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the arc, target mark and needle
        fn render(&mut self, time: f64) {
            let (w, h) = self.size;
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, w, h);

            let cx = w / 2.0;
            let cy = h * 0.8;
            let radius = (w.min(h) * 0.42).max(40.0);

            // The swing arc, left end (0°) to right end (180°)
            ctx.begin_path();
            ctx.set_line_width(4.0);
            ctx.set_stroke_style_str("#46627f");
            let _ = ctx.arc(cx, cy, radius, std::f64::consts::PI, std::f64::consts::TAU);
            ctx.stroke();

            // Target mark at the perfect center
            let target = needle_screen_rad(90.0) as f64;
            ctx.begin_path();
            ctx.set_line_width(3.0);
            ctx.set_stroke_style_str("#6fd06f");
            ctx.move_to(cx + (radius - 12.0) * target.cos(), cy + (radius - 12.0) * target.sin());
            ctx.line_to(cx + (radius + 12.0) * target.cos(), cy + (radius + 12.0) * target.sin());
            ctx.stroke();

            // Needle: live while swinging, frozen where it stopped
            let angle = self.controller.angle_at(time);
            let tip = needle_tip(angle, (radius - 16.0) as f32);
            let color = if self.last_snapshot.is_swinging {
                "#e8c34a"
            } else {
                "#d8604f"
            };
            ctx.begin_path();
            ctx.set_line_width(5.0);
            ctx.set_stroke_style_str(color);
            ctx.move_to(cx, cy);
            ctx.line_to(cx + tip.x as f64, cy + tip.y as f64);
            ctx.stroke();

            // Pivot
            ctx.begin_path();
            ctx.set_fill_style_str("#c8d4e0");
            let _ = ctx.arc(cx, cy, 7.0, 0.0, std::f64::consts::TAU);
            ctx.fill();

            if self.settings.show_fps {
                ctx.set_font("12px monospace");
                ctx.set_fill_style_str("#7f8fa0");
                let _ = ctx.fill_text(&format!("{} fps", self.fps), 8.0, 16.0);
            }
        }

        /// Sync HUD text and button state from the latest snapshot
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();
            let snap = &self.last_snapshot;

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&snap.score_text));
            }
            if let Some(el) = document.get_element_by_id("hud-turn") {
                el.set_text_content(Some(&snap.turn_text));
            }
            if let Some(el) = document.get_element_by_id("hud-winner") {
                el.set_text_content(Some(&snap.winner_text));
            }

            if let Some(btn) = document.get_element_by_id("start-btn") {
                let visible = snap.phase == Phase::Idle || snap.restart_visible;
                let _ = btn.set_attribute("class", if visible { "" } else { "hidden" });
                btn.set_text_content(Some(if snap.restart_visible {
                    "Restart"
                } else {
                    "Start"
                }));
            }

            for id in ["stop-left-btn", "stop-right-btn"] {
                if let Some(btn) = document.get_element_by_id(id) {
                    if snap.stop_enabled {
                        let _ = btn.remove_attribute("disabled");
                    } else {
                        let _ = btn.set_attribute("disabled", "disabled");
                    }
                }
            }

            if let Some(btn) = document.get_element_by_id("mode-btn") {
                btn.set_text_content(Some(match snap.mode {
                    Mode::Single => "1 player",
                    Mode::TwoPlayer => "2 players",
                }));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Arc Stop starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = Rc::new(RefCell::new(Game::new(canvas.clone(), ctx)));

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());

        request_animation_frame(game);

        log::info!("Arc Stop running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard: A stops for the left player, L for the right one
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" => g.input.stop = Some(StopTrigger::Left),
                    "l" | "L" => g.input.stop = Some(StopTrigger::Right),
                    " " | "Enter" => g.input.start = true,
                    "m" | "M" => g.input.toggle_mode = true,
                    "r" | "R" => g.input.reset = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: left half of the canvas is the left trigger, right half the
        // right one; outside a swing a click starts the round instead
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.last_snapshot.stop_enabled {
                    let mid = canvas_clone.client_width() as f64 / 2.0;
                    g.input.stop = Some(if (event.offset_x() as f64) < mid {
                        StopTrigger::Left
                    } else {
                        StopTrigger::Right
                    });
                } else {
                    g.input.start = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: same halves as the mouse mapping
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let mut g = game.borrow_mut();
                if g.last_snapshot.stop_enabled {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f64 - rect.left();
                    let mid = rect.width() / 2.0;
                    g.input.stop = Some(if x < mid {
                        StopTrigger::Left
                    } else {
                        StopTrigger::Right
                    });
                } else {
                    g.input.start = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.start = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("mode-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.toggle_mode = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (id, trigger) in [
            ("stop-left-btn", StopTrigger::Left),
            ("stop-right-btn", StopTrigger::Right),
        ] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().input.stop = Some(trigger);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.sync_size();
            g.update(time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arc Stop (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    demo_round();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted two-player round driven by synthetic timestamps
#[cfg(not(target_arch = "wasm32"))]
fn demo_round() {
    use arc_stop::sim::{Controller, StopTrigger, SwingConfig};

    let mut ctl = Controller::new(SwingConfig::default());
    ctl.toggle_mode(0.0);
    ctl.start(0.0);
    println!("needle at +450ms: {:.1}°", ctl.angle_at(450.0));

    ctl.stop(StopTrigger::Left, 900.0);
    ctl.tick(1900.0);
    let snap = ctl.stop(StopTrigger::Right, 2050.0);
    println!(
        "P1: {:?}  P2: {:?}  -> {}",
        snap.scores[0], snap.scores[1], snap.winner_text
    );
}
