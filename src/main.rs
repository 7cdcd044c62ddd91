//! Ashen Harbor entry point
//!
//! The web build runs the game loop on requestAnimationFrame; the native
//! build runs a scripted headless investigation for smoke testing.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use ashen_harbor::audio::{AudioSink, WebAudio};
    use ashen_harbor::frame::{FrameDriver, Schedule};
    use ashen_harbor::platform::InputState;
    use ashen_harbor::renderer::{Presenter, RenderOptions};
    use ashen_harbor::sim::{GameEvent, Session};
    use ashen_harbor::ui::HudSnapshot;
    use ashen_harbor::{Content, Settings, Tuning};

    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas && document.pointerLockElement !== canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.warn('Pointer lock failed:', e));
                }
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
    }

    /// Everything the page callbacks share
    struct Game {
        driver: FrameDriver,
        presenter: Option<Presenter>,
        audio: WebAudio,
        input: InputState,
        settings: Settings,
        /// A frame callback is pending
        looping: bool,
    }

    impl Game {
        /// Simulate, render and present one frame
        fn frame(&mut self, time: f64) -> Schedule {
            let input = self.input.frame_input();
            let schedule = self.driver.frame(time, &input);

            for event in self.driver.dispatch_events(&mut self.audio) {
                match event {
                    GameEvent::ClueDiscovered { index } => {
                        log::info!("Clue {} logged", index + 1);
                    }
                    GameEvent::StatusChanged { to, .. } if to.is_terminal() => {
                        self.audio.silence();
                    }
                    _ => {}
                }
            }

            self.present();
            self.update_hud();
            schedule
        }

        fn present(&mut self) {
            let flash = self
                .settings
                .effective_threat_flash(self.driver.session.threat_flash);
            let Some(presenter) = self.presenter.as_mut() else {
                return;
            };
            match presenter.present(&self.driver.frame, flash) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = (presenter.config.width, presenter.config.height);
                    presenter.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => log::error!("Out of memory!"),
                Err(e) => log::warn!("Present error: {:?}", e),
            }
        }

        /// Begin or reopen the case from the control button
        fn start(&mut self) {
            if self.driver.start() {
                self.audio.resume();
                request_pointer_lock();
            }
            self.update_hud();
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = HudSnapshot::capture(&self.driver.session, &self.settings);

            if let Some(el) = document.query_selector("#hud-objective .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.objective));
            }
            if let Some(el) = document.query_selector("#hud-fear .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.fear_percent.to_string()));
            }
            if let Some(el) = document.get_element_by_id("fear-fill") {
                let _ = el.set_attribute("style", &format!("width: {}%", hud.fear_percent));
            }
            if let Some(el) = document.get_element_by_id("narration") {
                if el.text_content().as_deref() != Some(hud.narration.as_str()) {
                    el.set_text_content(Some(&hud.narration));
                }
            }
            if let Some(el) = document.get_element_by_id("clue-log") {
                el.set_text_content(Some(&hud.clue_log.join("\n")));
            }
            if let Some(el) = document.get_element_by_id("start-btn") {
                match hud.control {
                    Some(label) => {
                        el.set_text_content(Some(label));
                        let _ = el.set_attribute("class", "");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            if let Some(presenter) = self.presenter.as_mut() {
                presenter.resize(width, height);
            }
            let (fw, fh) = self.settings.framebuffer_size(width, height);
            if let Err(e) = self.driver.resize(fw, fh) {
                log::warn!("Ignoring resize: {e}");
            }
        }
    }

    fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ashen Harbor starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let (width, height) = canvas_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let session = match Session::new(Content::hotel(), Tuning::default(), seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid content: {e}");
                return;
            }
        };
        let (fw, fh) = settings.framebuffer_size(width, height);
        let driver = match FrameDriver::new(session, fw, fh, RenderOptions::from_settings(&settings)) {
            Ok(driver) => driver,
            Err(e) => {
                log::error!("Renderer setup failed: {e}");
                return;
            }
        };
        log::info!("Session created with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let presenter = match Presenter::new(surface, &adapter, width, height, (fw, fh)).await {
            Ok(presenter) => Some(presenter),
            Err(e) => {
                log::error!("WebGPU presentation unavailable: {e}");
                None
            }
        };

        let mut audio = WebAudio::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);

        let game = Rc::new(RefCell::new(Game {
            driver,
            presenter,
            audio,
            input: InputState::new(),
            settings,
            looping: false,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_start_button(game.clone());
        setup_window_handlers(&canvas, game.clone());

        // Draw the idle view once so the hotel is visible behind the button
        {
            let mut g = game.borrow_mut();
            g.frame(0.0);
        }

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }
        log::info!("Ashen Harbor ready");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Pointer lock gates heading input
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = web_sys::window()
                    .and_then(|w| w.document())
                    .is_some_and(|d| d.pointer_lock_element().is_some());
                log::debug!("Pointer lock: {locked}");
                game.borrow_mut().input.set_look_locked(locked);
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Relative pointer motion turns the view
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let g = &mut *game.borrow_mut();
                g.input.pointer_moved(event.movement_x() as f32, &g.settings);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Clicking the view recaptures the pointer mid-investigation
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let g = game.borrow();
                if !g.input.look_locked() && !g.driver.session.is_terminal() {
                    drop(g);
                    request_pointer_lock();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_up(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let start_loop = {
                    let mut g = game.borrow_mut();
                    g.start();
                    let start_loop = !g.looping && !g.driver.session.is_terminal();
                    if start_loop {
                        g.looping = true;
                    }
                    start_loop
                };
                if start_loop {
                    request_animation_frame(game.clone());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Focus lost: release keys, optionally mute
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.input.release_all();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hidden tabs stop getting frames; do not bill the gap as one step
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().driver.resume();
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (width, height) = canvas_size(&canvas);
                canvas.set_width(width);
                canvas.set_height(height);
                game.borrow_mut().resize(width, height);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
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

    fn retry_after(game: Rc<RefCell<Game>>, delay_ms: u32) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move || {
            request_animation_frame(game);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms as i32,
        );
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let schedule = game.borrow_mut().frame(time);
        match schedule {
            Schedule::NextFrame => request_animation_frame(game),
            Schedule::RetryAfter(ms) => retry_after(game, ms),
            Schedule::Stop => game.borrow_mut().looping = false,
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ashen Harbor (native) starting...");
    log::info!("Native mode runs a scripted investigation headless - use `trunk serve` to play");

    if let Err(e) = headless::run(std::env::args().skip(1)) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;
    use std::f32::consts::FRAC_PI_2;

    use ashen_harbor::audio::{AudioSink, LogAudio};
    use ashen_harbor::consts::{DEFAULT_SEED, DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};
    use ashen_harbor::frame::{FrameDriver, Schedule};
    use ashen_harbor::renderer::RenderOptions;
    use ashen_harbor::sim::{FrameInput, GameEvent, MoveIntent, Session};
    use ashen_harbor::ui::HudSnapshot;
    use ashen_harbor::{Content, Settings, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    struct Options {
        seed: u64,
        frames: u32,
        tuning: Option<String>,
    }

    fn parse(mut args: impl Iterator<Item = String>) -> Result<Options, Box<dyn Error>> {
        let mut options = Options {
            seed: DEFAULT_SEED,
            frames: 60 * 60,
            tuning: None,
        };
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
            match arg.as_str() {
                "--seed" => options.seed = value()?.parse()?,
                "--frames" => options.frames = value()?.parse()?,
                "--tuning" => options.tuning = Some(value()?),
                other => return Err(format!("unknown argument: {other}").into()),
            }
        }
        Ok(options)
    }

    /// Walk two seconds, turn a quarter for half a second, breathe now and then
    fn autopilot(frame: u32) -> FrameInput {
        let cycle = frame % 150;
        let turning = cycle >= 120;
        FrameInput {
            movement: MoveIntent {
                forward: !turning,
                run: frame % 600 < 120,
                ..MoveIntent::default()
            },
            heading_delta: if turning { FRAC_PI_2 / 30.0 } else { 0.0 },
            look_locked: true,
            steady_breath: frame % 600 == 300,
        }
    }

    pub fn run(args: impl Iterator<Item = String>) -> Result<(), Box<dyn Error>> {
        let options = parse(args)?;
        let tuning = match &options.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let settings = Settings::load();

        let session = Session::new(Content::hotel(), tuning, options.seed)?;
        let mut driver = FrameDriver::new(
            session,
            DEFAULT_VIEW_WIDTH,
            DEFAULT_VIEW_HEIGHT,
            RenderOptions::from_settings(&settings),
        )?;
        let mut audio = LogAudio::default();

        driver.start();
        let mut timestamp = 0.0;
        let mut frames = 0;
        while frames < options.frames {
            let schedule = driver.frame(timestamp, &autopilot(frames));
            for event in driver.dispatch_events(&mut audio) {
                if let GameEvent::ClueDiscovered { index } = event {
                    log::info!("Clue {} logged at {:.1}s", index + 1, driver.session.clock);
                }
            }
            frames += 1;
            match schedule {
                Schedule::NextFrame => timestamp += FRAME_MS,
                Schedule::RetryAfter(ms) => timestamp += ms as f64,
                Schedule::Stop => break,
            }
        }
        audio.silence();

        let hud = HudSnapshot::capture(&driver.session, &settings);
        log::info!(
            "Finished after {frames} frames: {:?}, clues {}, fear {}%, {} sounds",
            hud.status,
            hud.objective,
            hud.fear_percent,
            audio.played()
        );
        log::info!("Last narration: {}", hud.narration);
        Ok(())
    }
}
