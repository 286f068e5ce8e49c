//! Arena Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use arena_rush::audio::{AudioManager, SoundEffect};
    use arena_rush::consts::*;
    use arena_rush::renderer::CanvasRenderer;
    use arena_rush::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use arena_rush::{HighScores, Settings};

    /// Music note cadence: 500 ms at the 60 Hz tick rate
    const MUSIC_STEP_TICKS: u32 = 30;

    /// Held-key and pointer state maintained by the event listeners
    ///
    /// Level-triggered fields mirror what is currently held; `fire`, `reload`
    /// and `dash` are one-shot flags consumed by the next tick.
    #[derive(Debug, Default)]
    struct InputState {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        pointer: Vec2,
        fire: bool,
        reload: bool,
        dash: bool,
    }

    impl InputState {
        fn snapshot(&self) -> TickInput {
            TickInput {
                up: self.up,
                down: self.down,
                left: self.left,
                right: self.right,
                aim: self.pointer,
                fire: self.fire,
                reload: self.reload,
                dash: self.dash,
            }
        }

        fn clear_one_shots(&mut self) {
            self.fire = false;
            self.reload = false;
            self.dash = false;
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        input: InputState,
        accumulator: f32,
        last_time: f64,
        music_ticks: u32,
        /// Guards the one-time game over bookkeeping per session
        game_over_handled: bool,
    }

    impl Game {
        fn new(state: GameState, renderer: CanvasRenderer) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            audio.set_music_volume(settings.music_volume);
            audio.set_muted(settings.muted);

            Self {
                state,
                renderer,
                audio,
                settings,
                highscores: HighScores::load(),
                input: InputState::default(),
                accumulator: 0.0,
                last_time: 0.0,
                music_ticks: 0,
                game_over_handled: false,
            }
        }

        /// Run simulation ticks through the fixed-timestep accumulator
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.snapshot();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
                self.input.clear_one_shots();

                for event in self.state.take_events() {
                    self.handle_event(event);
                }

                // Background music is clocked off the sim so it stops with it
                if self.state.phase == GamePhase::Running {
                    self.music_ticks += 1;
                    if self.music_ticks >= MUSIC_STEP_TICKS {
                        self.music_ticks = 0;
                        self.audio.music_step();
                    }
                }
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Shot => self.audio.play(SoundEffect::Shoot),
                GameEvent::ReloadStarted => self.audio.play(SoundEffect::Reload),
                GameEvent::EnemyKilled => self.audio.play(SoundEffect::EnemyDeath),
                GameEvent::PlayerHit => self.audio.play(SoundEffect::PlayerDamage),
                GameEvent::GameOver => self.handle_game_over(),
            }
        }

        /// Session ended: record the score and reveal the game over screen
        fn handle_game_over(&mut self) {
            if self.game_over_handled {
                return;
            }
            self.game_over_handled = true;

            let score = self.state.score;
            let kills = self.state.kills;
            if let Some(rank) = self.highscores.add_score(score, kills, js_sys::Date::now()) {
                log::info!("New high score: {} (rank {})", score, rank);
                self.highscores.save();
            }

            let document = web_sys::window().unwrap().document().unwrap();
            if let Some(el) = document.get_element_by_id("finalScore") {
                el.set_text_content(Some(&score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("enemiesKilled") {
                el.set_text_content(Some(&kills.to_string()));
            }
            if let Some(el) = document.get_element_by_id("topScore") {
                if let Some(best) = self.highscores.top_score() {
                    el.set_text_content(Some(&best.to_string()));
                }
            }
            if let Some(el) = document.get_element_by_id("gameOver") {
                let _ = el.set_attribute("class", "overlay");
            }
        }

        /// Render the current frame
        fn render(&self) {
            let crosshair = self.settings.show_crosshair.then_some(self.input.pointer);
            if let Err(e) = self.renderer.draw(&self.state, crosshair) {
                log::warn!("Render error: {:?}", e);
            }
        }

        /// Update score/health text in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("scoreValue") {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("healthValue") {
                el.set_text_content(Some(&self.state.health.to_string()));
            }
        }

        /// Flip the persisted mute preference (the `m` key)
        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.set_muted(self.settings.muted);
            self.settings.save();
            log::info!(
                "Audio {}",
                if self.settings.muted { "muted" } else { "unmuted" }
            );
        }

        /// Begin a fresh session (first start and restart share this path)
        fn start_session(&mut self) {
            self.state.start();
            self.input = InputState::default();
            self.accumulator = 0.0;
            self.music_ticks = 0;
            self.game_over_handled = false;
            self.audio.resume();
            self.audio.reset_music();
            log::info!("Session started (seed {})", self.state.seed);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Arena Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Arena matches the canvas at 80% of the viewport
        let width = (window.inner_width().unwrap().as_f64().unwrap() * 0.8) as u32;
        let height = (window.inner_height().unwrap().as_f64().unwrap() * 0.8) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")
            .expect("canvas context failed")
            .expect("no 2d context")
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(width as f32, height as f32, seed);
        let game = Rc::new(RefCell::new(Game::new(state, CanvasRenderer::new(ctx))));

        log::info!("Game initialized with seed: {}", seed);

        if let Some(el) = document.get_element_by_id("topScore") {
            if let Some(best) = game.borrow().highscores.top_score() {
                el.set_text_content(Some(&best.to_string()));
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_menu_buttons(game.clone());
        setup_blur_mute(game.clone());
        setup_resize(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Arena Rush running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down: held movement keys plus reload/dash one-shots
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" => g.input.up = true,
                    "s" | "S" => g.input.down = true,
                    "a" | "A" => g.input.left = true,
                    "d" | "D" => g.input.right = true,
                    "r" | "R" => g.input.reload = true,
                    " " => g.input.dash = true,
                    "m" | "M" => g.toggle_mute(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up: release held movement keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" => g.input.up = false,
                    "s" | "S" => g.input.down = false,
                    "a" | "A" => g.input.left = false,
                    "d" | "D" => g.input.right = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move: aim in canvas coordinates
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let mut g = game.borrow_mut();
                g.input.pointer = Vec2::new(
                    event.client_x() as f32 - rect.left() as f32,
                    event.client_y() as f32 - rect.top() as f32,
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer press: fire
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        // Start button: hide the menu and enter the first session
        if let Some(btn) = document.get_element_by_id("startButton") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(el) = document.get_element_by_id("startMenu") {
                    let _ = el.set_attribute("class", "overlay hidden");
                }
                game.borrow_mut().start_session();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart button: hide the game over screen and reset in place
        if let Some(btn) = document.get_element_by_id("restartButton") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(el) = document.get_element_by_id("gameOver") {
                    let _ = el.set_attribute("class", "overlay hidden");
                }
                game.borrow_mut().start_session();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Mute audio while the window is unfocused (if the setting is on)
    fn setup_blur_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus restores the persisted preference, not unconditional unmute
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let muted = g.settings.muted;
                g.audio.set_muted(muted);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Keep the canvas and arena matched to the viewport across resizes
    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = (window.inner_width().unwrap().as_f64().unwrap() * 0.8) as u32;
            let height = (window.inner_height().unwrap().as_f64().unwrap() * 0.8) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut().state.arena = Vec2::new(width as f32, height as f32);
        });
        let _ =
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
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
    log::info!("Arena Rush (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    // Headless smoke run of the sim
    smoke_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_run() {
    use arena_rush::consts::SIM_DT;
    use arena_rush::sim::{GameState, TickInput, tick};

    let mut state = GameState::new(1024.0, 768.0, 0xDECAF);
    state.start();

    let input = TickInput::default();
    for _ in 0..600 {
        tick(&mut state, &input, SIM_DT);
        state.take_events();
    }

    println!(
        "✓ simulated {} ticks: phase {:?}, {} enemies, health {}",
        state.time_ticks,
        state.phase,
        state.enemies.len(),
        state.health
    );
}
