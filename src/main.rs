//! Minion Hammer entry point
//!
//! Web: drives the session from the browser, with the pointer standing in for
//! the tracked hand (press to bring the hammer down).
//! Native: runs a scripted demo session against the in-process authority.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, MouseEvent, PointerEvent, WheelEvent};

    use glam::Vec3;
    use minion_hammer::Settings;
    use minion_hammer::audio::AudioManager;
    use minion_hammer::consts::SIM_DT;
    use minion_hammer::net::{Endpoint, UriError, fetch};
    use minion_hammer::sim::{FeedbackSink, SessionState, TickInput, deliver, dispatch, start, tick};

    /// Half-width of the play area in world units (pointer maps onto it)
    const ARENA_HALF_EXTENT: f32 = 1.0;
    /// Simulated hand height above the surface while raised
    const RAISED_Z: f32 = 0.6;
    /// Wheel step for the simulated surface height
    const SURFACE_STEP: f32 = 0.05;
    /// Simulated surface stays within +/- this height
    const SURFACE_LIMIT: f32 = 0.5;

    /// Maximum fixed steps per frame
    const MAX_SUBSTEPS: u32 = 8;

    /// Scene text nodes the feedback events write to
    struct DomSink<'a> {
        document: &'a Document,
        audio: &'a AudioManager,
    }

    impl FeedbackSink for DomSink<'_> {
        fn play_kill_sound(&mut self) {
            self.audio.play_kill();
        }

        fn set_status_text(&mut self, text: &str) {
            if let Some(el) = self.document.get_element_by_id("status") {
                el.set_text_content(Some(text));
            }
        }

        fn set_hint_text(&mut self, text: &str) {
            if let Some(el) = self.document.get_element_by_id("hint") {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: SessionState,
        endpoint: Endpoint,
        audio: AudioManager,
        input: TickInput,
        accumulator: f32,
        last_time: f64,
        /// Simulated hand (handSimulator): pointer x/y, pressed = down
        pointer: (f32, f32),
        pressed: bool,
        /// Height of the simulated table top; the pressed hand stops here
        surface_z: f32,
        /// Double-click asked for the ground plane to be re-tracked
        pending_anchor: bool,
    }

    impl Game {
        fn new(settings: &Settings) -> Result<Self, UriError> {
            Ok(Self {
                state: SessionState::new(settings),
                endpoint: Endpoint::new(&settings.base_url)?,
                audio: AudioManager::new(),
                input: TickInput::default(),
                accumulator: 0.0,
                last_time: 0.0,
                pointer: (0.0, 0.0),
                pressed: false,
                surface_z: 0.0,
                pending_anchor: false,
            })
        }

        fn hand_sample(&self) -> Vec3 {
            let z = if self.pressed {
                self.surface_z
            } else {
                self.surface_z + RAISED_Z
            };
            Vec3::new(self.pointer.0, self.pointer.1, z)
        }

        /// Run fixed session ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.input.hand_camera = Some(self.hand_sample());
            if self.pending_anchor {
                self.input.ground_z = Some(self.surface_z);
            }

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                // Re-anchoring is a one-shot event
                self.input.ground_z = None;
                self.pending_anchor = false;
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Position pooled slot nodes and the hit indicator
        fn render(&self, document: &Document) {
            for (i, slot) in self.state.slots.iter().enumerate() {
                let Some(el) = document.get_element_by_id(&format!("slot-{}", i)) else {
                    continue;
                };
                let Ok(el) = el.dyn_into::<HtmlElement>() else {
                    continue;
                };
                let style = el.style();
                if slot.is_visible() {
                    let (left, top) = world_to_percent(slot.position.x, slot.position.y);
                    let _ = style.set_property("display", "block");
                    let _ = style.set_property("left", &format!("{:.2}%", left));
                    let _ = style.set_property("top", &format!("{:.2}%", top));
                    let _ = style.set_property(
                        "transform",
                        &format!("translate(-50%, -50%) rotate({:.3}rad)", -slot.facing),
                    );
                } else {
                    let _ = style.set_property("display", "none");
                }
            }

            if let Some(el) = document.get_element_by_id("hit-indicator") {
                let class = if self.state.hit_indicator_visible {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn world_to_percent(x: f32, y: f32) -> (f32, f32) {
        let left = (x / ARENA_HALF_EXTENT * 0.5 + 0.5) * 100.0;
        let top = (0.5 - y / ARENA_HALF_EXTENT * 0.5) * 100.0;
        (left, top)
    }

    /// Send queued requests; each response is delivered back when it lands
    fn flush_requests(game: &Rc<RefCell<Game>>) {
        let (endpoint, requests) = {
            let mut g = game.borrow_mut();
            (g.endpoint.clone(), g.state.take_requests())
        };
        for request in requests {
            let game = game.clone();
            fetch::spawn(endpoint.clone(), request, move |response| {
                deliver(&mut game.borrow_mut().state, response);
            });
        }
    }

    fn flush_feedback(game: &Rc<RefCell<Game>>, document: &Document) {
        let mut g = game.borrow_mut();
        let events = g.state.take_events();
        let mut sink = DomSink {
            document,
            audio: &g.audio,
        };
        dispatch(events, &mut sink);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Minion Hammer starting...");

        let settings = Settings::load();
        log::info!("Minion authority: {}", settings.base_url);

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = match Game::new(&settings) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Bad minion authority URL {:?}: {}", settings.base_url, e);
                return;
            }
        };
        start(&mut game.borrow_mut().state);
        flush_requests(&game);

        setup_input_handlers(&document, game.clone());
        request_animation_frame(game);

        log::info!("Minion Hammer running!");
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(arena) = document
            .get_element_by_id("arena")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            log::error!("No #arena element; input disabled");
            return;
        };

        // Pointer move: hand follows the pointer across the arena
        {
            let game = game.clone();
            let arena_clone = arena.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let rect = arena_clone.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                let u = ((event.client_x() as f64 - rect.left()) / rect.width()) as f32;
                let v = ((event.client_y() as f64 - rect.top()) / rect.height()) as f32;
                let mut g = game.borrow_mut();
                g.pointer = (
                    (u - 0.5) * 2.0 * ARENA_HALF_EXTENT,
                    (0.5 - v) * 2.0 * ARENA_HALF_EXTENT,
                );
            });
            let _ = arena
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down: hammer down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a user gesture
                g.audio.resume();
                g.pressed = true;
            });
            let _ = arena
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel: raise or lower the simulated table top
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                if event.delta_y() == 0.0 {
                    return;
                }
                let mut g = game.borrow_mut();
                let step = -(event.delta_y().signum() as f32) * SURFACE_STEP;
                g.surface_z = (g.surface_z + step).clamp(-SURFACE_LIMIT, SURFACE_LIMIT);
                log::debug!("Surface height {:.2}", g.surface_z);
            });
            let _ = arena.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Double-click: re-track the ground plane at the surface under the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.pending_anchor = true;
                log::info!("Ground plane anchored at z = {:.2}", g.surface_z);
            });
            let _ = arena.add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up/leave: hammer up
        for name in ["pointerup", "pointerleave", "pointercancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().pressed = false;
            });
            let _ = arena.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();

        *g.borrow_mut() = Some(Closure::new(move |time: f64| {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .expect("no document");

            {
                let mut game_ref = game.borrow_mut();
                let dt = if game_ref.last_time > 0.0 {
                    ((time - game_ref.last_time) / 1000.0) as f32
                } else {
                    SIM_DT
                };
                game_ref.last_time = time;
                game_ref.update(dt);
                game_ref.render(&document);
            }

            flush_requests(&game);
            flush_feedback(&game, &document);

            let window = web_sys::window().expect("no window");
            let _ = window.request_animation_frame(
                f.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            );
        }));

        let window = web_sys::window().expect("no window");
        let _ = window
            .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native_demo {
    use glam::Vec3;
    use minion_hammer::Settings;
    use minion_hammer::consts::SIM_DT;
    use minion_hammer::net::LocalAuthority;
    use minion_hammer::sim::{FeedbackSink, SessionState, TickInput, deliver, dispatch, start, tick};

    /// Demo length in seconds
    const DEMO_SECONDS: f32 = 30.0;
    /// Minions the local authority keeps alive
    const POPULATION: usize = 6;
    /// Hand speed toward its target (world units/s)
    const HAND_SPEED: f32 = 1.2;
    /// Time between dips (seconds)
    const DIP_PERIOD: f32 = 0.8;
    const RAISED_Z: f32 = 0.6;

    /// Feedback straight to the log
    struct LogSink {
        sounds: u32,
    }

    impl FeedbackSink for LogSink {
        fn play_kill_sound(&mut self) {
            self.sounds += 1;
            log::info!("*squelch*");
        }

        fn set_status_text(&mut self, text: &str) {
            if !text.is_empty() {
                log::info!("[status] {}", text);
            }
        }

        fn set_hint_text(&mut self, text: &str) {
            if !text.is_empty() {
                log::info!("[hint] {}", text);
            }
        }
    }

    /// Scripted hand: chase the closest visible minion, dip periodically
    fn scripted_hand(state: &SessionState, hand: Vec3, time: f32, dt: f32) -> Vec3 {
        let target = state
            .slots
            .iter()
            .filter(|s| s.is_visible())
            .map(|s| s.position)
            .min_by(|a, b| {
                a.distance_squared(hand)
                    .partial_cmp(&b.distance_squared(hand))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(Vec3::ZERO);

        let flat = Vec3::new(hand.x, hand.y, 0.0);
        let to_target = Vec3::new(target.x, target.y, 0.0) - flat;
        let step = to_target.clamp_length_max(HAND_SPEED * dt);

        // Down for the last quarter of each period
        let phase = (time % DIP_PERIOD) / DIP_PERIOD;
        let z = if phase > 0.75 {
            state.ground_z
        } else {
            RAISED_Z
        };
        Vec3::new(flat.x + step.x, flat.y + step.y, z)
    }

    pub fn run() {
        let settings = Settings::load();
        let mut state = SessionState::new(&settings);
        let mut authority = LocalAuthority::new(settings.rng_seed, POPULATION);
        let mut sink = LogSink { sounds: 0 };

        // A short outage a few seconds in exercises the retry policy
        let outage_at = 5.0;
        let mut outage_done = false;

        start(&mut state);

        let mut hand = Vec3::new(0.0, 0.0, RAISED_Z);
        let steps = (DEMO_SECONDS / SIM_DT) as u32;
        for step in 0..steps {
            let time = step as f32 * SIM_DT;
            if !outage_done && time >= outage_at {
                log::warn!("Simulating authority outage");
                authority.fail_next(503, 3);
                outage_done = true;
            }

            authority.step(SIM_DT);
            hand = scripted_hand(&state, hand, time, SIM_DT);
            let input = TickInput {
                hand_camera: Some(hand),
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);

            // The local authority answers instantly
            for request in state.take_requests() {
                let response = authority.handle(&request);
                deliver(&mut state, response);
            }
            dispatch(state.take_events(), &mut sink);

            if state.poller.is_stopped() {
                log::error!("Poll chain stopped; minions are frozen");
                break;
            }
        }

        log::info!(
            "Demo over after {:.1}s: {} strikes, {} kill requests, {} confirmed, server count {}, {} sounds",
            state.time,
            state.strikes,
            state.kills_requested,
            state.kills_confirmed,
            state.registry.killed(),
            sink.sounds
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Minion Hammer (native demo) starting...");
    log::info!("Browser build runs against a real authority - build for wasm32 to play");
    native_demo::run();
}
