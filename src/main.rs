//! Forest Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement, KeyboardEvent, TouchEvent};

    use forest_runner::audio::MusicPlayer;
    use forest_runner::platform::{Control, ControlState, LocalStorageStore};
    use forest_runner::renderer::InstanceBuffer;
    use forest_runner::sim::{GameEvent, GamePhase, Runner};
    use forest_runner::ui::{HudSink, HudSnapshot, run_over_message};
    use forest_runner::{GameError, Settings};

    /// Longest frame step fed to the simulation (tab switches, debugger pauses)
    const MAX_FRAME_DT: f32 = 0.1;

    // Bridge to the page's renderer: it owns the canvas and draws the instance buffer
    #[wasm_bindgen(inline_js = "
        export function upload_instances(bytes, count) {
            const r = window.forestRenderer;
            if (r && r.uploadInstances) {
                r.uploadInstances(bytes, count);
            }
        }

        export function set_camera(x, y, z) {
            const r = window.forestRenderer;
            if (r && r.setCamera) {
                r.setCamera(x, y, z);
            }
        }
    ")]
    extern "C" {
        fn upload_instances(bytes: &[u8], count: u32);
        fn set_camera(x: f32, y: f32, z: f32);
    }

    /// DOM HUD: score line, perk indicators and the start/game-over overlay
    struct DomHud {
        overlay: Option<Element>,
        title: Option<Element>,
        instructions: Option<Element>,
        start_button: Option<Element>,
        game_ui: Option<HtmlElement>,
        score: Option<Element>,
        high_score: Option<Element>,
        collision_perk: Option<Element>,
        slow_perk: Option<Element>,
        last: Option<HudSnapshot>,
    }

    impl DomHud {
        fn new(document: &Document) -> Self {
            let el = |id: &str| document.get_element_by_id(id);
            Self {
                overlay: el("ui-overlay"),
                title: el("ui-title"),
                instructions: el("ui-instructions"),
                start_button: el("start-button"),
                game_ui: el("game-ui").and_then(|e| e.dyn_into::<HtmlElement>().ok()),
                score: el("score"),
                high_score: el("high-score"),
                collision_perk: el("collision-perk"),
                slow_perk: el("slow-perk"),
                last: None,
            }
        }

        fn set_game_ui_visible(&self, visible: bool) {
            if let Some(ui) = &self.game_ui {
                let _ = ui
                    .style()
                    .set_property("display", if visible { "block" } else { "none" });
            }
        }

        fn set_overlay_hidden(&self, hidden: bool) {
            if let Some(overlay) = &self.overlay {
                let _ = overlay.class_list().toggle_with_force("hidden", hidden);
            }
        }
    }

    impl HudSink for DomHud {
        fn run_started(&mut self) {
            self.set_overlay_hidden(true);
            self.set_game_ui_visible(true);
            self.last = None;
        }

        fn update(&mut self, hud: &HudSnapshot) {
            // Skip unchanged frames
            if self.last.as_ref() == Some(hud) {
                return;
            }
            if let Some(el) = &self.score {
                el.set_text_content(Some(&format!("Score: {}", hud.score)));
            }
            if let Some(el) = &self.high_score {
                el.set_text_content(Some(&format!("High Score: {}", hud.high_score)));
            }
            if let Some(el) = &self.collision_perk {
                let _ = el
                    .class_list()
                    .toggle_with_force("active", hud.collision_perk_active());
                el.set_text_content(Some(&hud.collision_perk_label()));
            }
            if let Some(el) = &self.slow_perk {
                let _ = el.class_list().toggle_with_force("active", hud.slow_time_active);
            }
            self.last = Some(*hud);
        }

        fn run_over(&mut self, score: u64, high_score: u64) {
            if let Some(el) = &self.title {
                el.set_text_content(Some("Game Over"));
            }
            if let Some(el) = &self.instructions {
                el.set_inner_html(&format!(
                    "{}<br>High Score: {}",
                    run_over_message(score),
                    high_score
                ));
            }
            if let Some(el) = &self.start_button {
                el.set_text_content(Some("RUN AGAIN"));
            }
            self.set_overlay_hidden(false);
            self.set_game_ui_visible(false);
        }
    }

    /// Game instance holding all state
    struct Game {
        runner: Runner,
        controls: ControlState,
        surface: Rc<RefCell<InstanceBuffer>>,
        /// rAF timestamp of the previous frame (ms)
        last_time: f64,
        /// rAF timestamp the clock counts from (ms)
        start_time: f64,
        /// Set after a fatal tick error; the loop stops rescheduling
        halted: bool,
    }

    impl Game {
        fn frame(&mut self, now: f64) {
            if self.start_time == 0.0 {
                self.start_time = now;
                self.last_time = now;
            }
            let dt = (((now - self.last_time) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT);
            self.last_time = now;
            let time = ((now - self.start_time) / 1000.0) as f32;

            let input = self.controls.snapshot();
            match self.runner.tick(&input, dt, time) {
                Ok(events) => {
                    for event in events {
                        match event {
                            GameEvent::RunOver { .. } => self.controls.clear(),
                            GameEvent::NewHighScore(_) | GameEvent::PerkCollected(_) => {}
                            other => log::debug!("{:?}", other),
                        }
                    }
                }
                Err(e) => {
                    log::error!("Fatal error, stopping: {}", e);
                    self.halted = true;
                    return;
                }
            }

            let player = self.runner.player().position;
            set_camera(player.x, player.y, player.z);
            let mut surface = self.surface.borrow_mut();
            if let Some(bytes) = surface.take_upload() {
                upload_instances(&bytes, surface.instance_count() as u32);
            }
        }

        fn start(&mut self) {
            if self.runner.phase() == GamePhase::Running {
                return;
            }
            self.controls.clear();
            self.runner.start_run();
        }
    }

    fn document() -> Result<Document, GameError> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or(GameError::MissingCollaborator("document"))
    }

    pub fn run() -> Result<(), GameError> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Forest Runner starting...");

        let document = document()?;
        let settings = Settings::load();
        let surface = Rc::new(RefCell::new(InstanceBuffer::new()));
        let volume = settings.effective_music_volume();

        let runner = Runner::builder(settings)
            .seed(js_sys::Date::now() as u64)
            .surface(surface.clone())
            .store(LocalStorageStore::open()?)
            .hud(DomHud::new(&document))
            .audio(MusicPlayer::new(volume))
            .build()?;

        if let Some(el) = document.get_element_by_id("high-score") {
            el.set_text_content(Some(&format!("High Score: {}", runner.high_score())));
        }

        let game = Rc::new(RefCell::new(Game {
            runner,
            controls: ControlState::new(),
            surface,
            last_time: 0.0,
            start_time: 0.0,
            halted: false,
        }));

        setup_keyboard(&document, game.clone());
        setup_touch_buttons(&document, game.clone());
        setup_start_button(&document, game.clone());

        request_animation_frame(game);

        log::info!("Forest Runner ready");
        Ok(())
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.controls.key_down(&event.key(), &event.code()) {
                    event.prevent_default();
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().controls.key_up(&event.key(), &event.code());
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        for id in Control::BUTTON_IDS {
            let (Some(button), Some(control)) =
                (document.get_element_by_id(id), Control::from_button_id(id))
            else {
                continue;
            };

            for (event_name, pressed) in [("touchstart", true), ("touchend", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    if pressed {
                        g.controls.press(control);
                    } else {
                        g.controls.release(control);
                    }
                });
                let _ = button.add_event_listener_with_callback_and_add_event_listener_options(
                    event_name,
                    closure.as_ref().unchecked_ref(),
                    &options,
                );
                closure.forget();
            }
        }
    }

    fn setup_start_button(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(button) = document.get_element_by_id("start-button") else {
            log::warn!("No #start-button; runs cannot be started");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().start();
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let halted = {
            let mut g = game.borrow_mut();
            g.frame(time);
            g.halted
        };

        if !halted {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Forest Runner (native) starting...");
    log::info!("The game itself runs in the browser; this is a headless run");

    match headless_run(60.0) {
        Ok(score) => println!("Headless run finished with score {}", score),
        Err(e) => {
            log::error!("Headless run failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Run straight ahead at 60 fps until the run ends or `seconds` pass
#[cfg(not(target_arch = "wasm32"))]
fn headless_run(seconds: f32) -> forest_runner::Result<u64> {
    use forest_runner::Settings;
    use forest_runner::persistence::MemoryStore;
    use forest_runner::renderer::InstanceBuffer;
    use forest_runner::sim::{GameEvent, Runner, TickInput};

    const DT: f32 = 1.0 / 60.0;

    let mut runner = Runner::builder(Settings::default())
        .seed(0x5eed)
        .surface(InstanceBuffer::new())
        .store(MemoryStore::new())
        .build()?;
    runner.start_run();

    let mut time = 0.0;
    // Jump every two seconds; enough to clear the occasional log
    let mut next_jump = 2.0;
    while time < seconds {
        let input = TickInput {
            jump_requested: time >= next_jump,
            ..Default::default()
        };
        if input.jump_requested {
            next_jump += 2.0;
        }
        for event in runner.tick(&input, DT, time)? {
            if let GameEvent::RunOver { score } = event {
                log::info!("Crashed after {:.1}s", time);
                return Ok(score);
            }
        }
        time += DT;
    }
    Ok(runner.run().score)
}
