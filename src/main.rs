//! Neon Drift entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use neon_drift::audio::AudioManager;
    use neon_drift::consts::GAME_OVER_DELAY_MS;
    use neon_drift::platform::PointerInput;
    use neon_drift::renderer::Canvas2d;
    use neon_drift::sim::{GameMode, Viewport};
    use neon_drift::{Engine, RunPhase, ScoreSink, Settings};

    /// Score sink writing into the DOM overlay
    struct Hud {
        document: Document,
        /// Set once the game-over screen is showing
        game_over_shown: bool,
    }

    impl Hud {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn show(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if visible {
                    classes.add_1("active")
                } else {
                    classes.remove_1("active")
                };
            }
        }

        fn highlight_mode(&self, mode: GameMode) {
            for m in [GameMode::Normal, GameMode::Hardcore, GameMode::Zen] {
                let id = format!("mode-{}", m.as_str().to_lowercase());
                if let Some(el) = self.document.get_element_by_id(&id) {
                    let _ = el.class_list().toggle_with_force("selected", m == mode);
                }
            }
        }
    }

    impl ScoreSink for Hud {
        fn on_score_update(&mut self, score: u32) {
            self.set_text("score", &score.to_string());
        }

        fn on_game_over(&mut self, score: u32) {
            self.set_text("final-score", &score.to_string());
            self.show("game-hud", false);
            self.show("game-over", true);
            self.game_over_shown = true;
        }
    }

    /// Game instance holding all state
    struct Game {
        engine: Engine<AudioManager, Hud>,
        pointer: PointerInput,
        canvas: Canvas2d,
        element: HtmlCanvasElement,
        mode: GameMode,
        settings: Settings,
    }

    impl Game {
        /// Click, tap or Space: start from the menu, leave the game-over screen
        fn handle_input(&mut self) -> bool {
            self.engine.audio_mut().unlock();
            match self.engine.phase() {
                RunPhase::Menu => self.start(),
                RunPhase::GameOver if self.engine.ui().game_over_shown => {
                    self.back_to_menu();
                    false
                }
                _ => false,
            }
        }

        fn start(&mut self) -> bool {
            let seed = js_sys::Date::now() as u64;
            self.pointer.clear();
            if !self.engine.start(self.mode, seed) {
                return false;
            }
            let hud = self.engine.ui_mut();
            hud.game_over_shown = false;
            hud.set_text("score", "0");
            hud.show("main-menu", false);
            hud.show("game-over", false);
            hud.show("game-hud", true);
            true
        }

        fn back_to_menu(&mut self) {
            self.engine.reset();
            let hud = self.engine.ui();
            hud.show("game-over", false);
            hud.show("main-menu", true);
            hud.highlight_mode(self.mode);
        }

        fn select_mode(&mut self, mode: GameMode) {
            if self.engine.phase() != RunPhase::Menu {
                return;
            }
            self.mode = mode;
            self.settings.preferred_mode = mode;
            self.settings.save();
            self.engine.ui().highlight_mode(mode);
            log::info!("Selected {} mode", mode.as_str());
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
            self.element.set_width(width as u32);
            self.element.set_height(height as u32);
            self.engine.resize(width as f32, height as f32);
        }

        /// Pointer position relative to the canvas
        fn pointer_at(&mut self, client_x: i32, client_y: i32) {
            let rect = self.element.get_bounding_client_rect();
            self.pointer.move_to(
                (client_x as f64 - rect.left()) as f32,
                (client_y as f64 - rect.top()) as f32,
            );
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        log::info!("Neon Drift starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let element: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = element
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let settings = Settings::load();
        let mode = settings.preferred_mode;
        let seed = js_sys::Date::now() as u64;
        let hud = Hud {
            document: document.clone(),
            game_over_shown: false,
        };
        hud.highlight_mode(mode);
        let engine = Engine::new(
            Viewport::new(element.width() as f32, element.height() as f32),
            settings.clone(),
            AudioManager::new(&settings, seed),
            hud,
        );

        let game = Rc::new(RefCell::new(Game {
            engine,
            pointer: PointerInput::new(),
            canvas: Canvas2d::new(ctx),
            element: element.clone(),
            mode,
            settings,
        }));
        game.borrow_mut().resize();

        setup_input_handlers(&element, &document, game.clone())?;
        setup_menu_buttons(&document, game.clone())?;

        log::info!("Neon Drift ready");
        Ok(())
    }

    fn listen<E, F>(target: &web_sys::EventTarget, name: &str, handler: F) -> Result<(), JsValue>
    where
        E: FromWasmAbi + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Start or leave a run, kicking off the frame loop when a run begins
    fn handle_input(game: &Rc<RefCell<Game>>) {
        let started = game.borrow_mut().handle_input();
        if started {
            request_animation_frame(game.clone());
        }
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Mouse move
        {
            let game = game.clone();
            listen(canvas, "mousemove", move |event: MouseEvent| {
                game.borrow_mut()
                    .pointer_at(event.client_x(), event.client_y());
            })?;
        }

        // Touch move / start
        for name in ["touchmove", "touchstart"] {
            let game = game.clone();
            listen(canvas, name, move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .pointer_at(touch.client_x(), touch.client_y());
                }
            })?;
        }

        // Click / tap anywhere
        {
            let game = game.clone();
            listen(document, "click", move |_event: MouseEvent| handle_input(&game))?;
        }
        {
            let game = game.clone();
            listen(document, "touchend", move |_event: TouchEvent| {
                game.borrow_mut().engine.audio_mut().unlock();
            })?;
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            listen(&window, "keydown", move |event: KeyboardEvent| {
                match event.code().as_str() {
                    "Space" | "Enter" => {
                        event.prevent_default();
                        handle_input(&game);
                    }
                    "Digit1" => game.borrow_mut().select_mode(GameMode::Normal),
                    "Digit2" => game.borrow_mut().select_mode(GameMode::Hardcore),
                    "Digit3" => game.borrow_mut().select_mode(GameMode::Zen),
                    _ => {}
                }
            })?;
        }

        // Resize
        {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            listen(&window, "resize", move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            })?;
        }

        Ok(())
    }

    fn setup_menu_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for mode in [GameMode::Normal, GameMode::Hardcore, GameMode::Zen] {
            let id = format!("mode-{}", mode.as_str().to_lowercase());
            let Some(btn) = document.get_element_by_id(&id) else {
                log::warn!("Missing menu button #{}", id);
                continue;
            };
            let game = game.clone();
            listen(&btn, "click", move |event: MouseEvent| {
                // Selecting a mode also starts the run
                event.stop_propagation();
                game.borrow_mut().select_mode(mode);
                handle_input(&game);
            })?;
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = {
            let mut g = game.borrow_mut();
            let Game {
                engine,
                pointer,
                canvas,
                ..
            } = &mut *g;
            engine.frame(time, &*pointer, canvas)
        };

        if keep_going {
            request_animation_frame(game);
        } else if game.borrow().engine.pending_notice().is_some() {
            schedule_game_over(game);
        }
    }

    /// Deliver the game-over notice on a wall-clock timer
    fn schedule_game_over(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move || {
            let now = web_sys::window()
                .and_then(|w| w.performance())
                .map_or(f64::INFINITY, |p| p.now());
            let mut g = game.borrow_mut();
            if g.engine.poll_deferred(now) {
                g.engine.stop();
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            GAME_OVER_DELAY_MS as i32,
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon Drift (native) starting...");
    log::info!("The playable build is the web version - run with `trunk serve`");

    let mut args = std::env::args().skip(1);
    let mode = args
        .next()
        .and_then(|m| neon_drift::sim::GameMode::from_str(&m))
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let outcome = headless::autopilot(mode, seed, 60 * 120);
    println!(
        "{} run (seed {}): score {} after {:.1}s{}",
        mode.as_str(),
        seed,
        outcome.score,
        outcome.seconds,
        if outcome.died { "" } else { " (survived)" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted runs without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use neon_drift::audio::SilentAudio;
    use neon_drift::consts::GAME_OVER_DELAY_MS;
    use neon_drift::renderer::Canvas;
    use neon_drift::sim::{GameMode, GameState, Viewport};
    use neon_drift::{Engine, Rgb, ScoreSink, Settings};

    /// Drops every draw call
    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn translate(&mut self, _offset: Vec2) {}
        fn set_glow(&mut self, _blur: f32, _color: Rgb) {}
        fn fill_rect(&mut self, _min: Vec2, _size: Vec2, _color: Rgb, _alpha: f32) {}
        fn fill_circle(&mut self, _c: Vec2, _r: f32, _color: Rgb, _alpha: f32) {}
        fn stroke_circle(&mut self, _c: Vec2, _r: f32, _color: Rgb, _a: f32, _w: f32) {}
        fn line(&mut self, _from: Vec2, _to: Vec2, _color: Rgb, _alpha: f32, _width: f32) {}
        fn text(&mut self, _label: &str, _at: Vec2, _color: Rgb) {}
    }

    #[derive(Default)]
    struct LogScore {
        final_score: Option<u32>,
    }

    impl ScoreSink for LogScore {
        fn on_score_update(&mut self, score: u32) {
            log::debug!("score {}", score);
        }

        fn on_game_over(&mut self, score: u32) {
            log::info!("Game over, final score {}", score);
            self.final_score = Some(score);
        }
    }

    pub struct Outcome {
        pub score: u32,
        pub seconds: f32,
        pub died: bool,
    }

    /// Head for the nearest pickup unless an obstacle is coming down the lane
    fn steer(state: &GameState) -> Vec2 {
        let player = &state.player;
        let lane = player.radius * 3.0;

        let threat = state.stage.obstacles().iter().find(|o| {
            let gap = player.pos.y - o.rect.max().y;
            (0.0..200.0).contains(&gap)
                && player.pos.x + lane > o.rect.min().x
                && player.pos.x - lane < o.rect.max().x
        });
        if let Some(o) = threat {
            let left = o.rect.min().x - lane;
            let right = o.rect.max().x + lane;
            let x = if (player.pos.x - left).abs() < (right - player.pos.x).abs() && left > 0.0 {
                left
            } else {
                right
            };
            return Vec2::new(x, player.pos.y);
        }

        state
            .stage
            .collectibles()
            .iter()
            .filter(|c| !c.collected && c.pos.y < player.pos.y)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
            .map_or(state.viewport.center(), |c| c.pos)
    }

    pub fn autopilot(mode: GameMode, seed: u64, max_frames: u32) -> Outcome {
        let mut engine = Engine::new(
            Viewport::new(480.0, 800.0),
            Settings::load(),
            SilentAudio::default(),
            LogScore::default(),
        );
        engine.start(mode, seed);

        let frame_ms = 1000.0 / 60.0;
        let mut now = 0.0;
        for _ in 0..max_frames {
            let Some(state) = engine.state() else { break };
            let target = steer(state);
            if !engine.frame(now, &target, &mut NullCanvas) {
                break;
            }
            now += frame_ms;
        }

        let died = engine.pending_notice().is_some();
        if died {
            engine.poll_deferred(now + GAME_OVER_DELAY_MS);
        }
        let seconds = engine.state().map_or(0.0, |s| s.elapsed);
        let score = engine.ui().final_score.unwrap_or_else(|| engine.score());
        engine.stop();
        log::info!("{} cues played", engine.audio().cues);

        Outcome {
            score,
            seconds,
            died,
        }
    }
}
