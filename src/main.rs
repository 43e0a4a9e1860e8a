//! Monarch Reels entry point
//!
//! In the browser: builds the reel columns and drives the machine from a
//! requestAnimationFrame loop. Natively: runs a headless session and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use monarch_reels::animation::SpinAnimation;
    use monarch_reels::consts::REEL_COUNT;
    use monarch_reels::sim::{Machine, RoundEvent};
    use monarch_reels::view::Presentation;
    use monarch_reels::{Settings, Symbol};

    /// A reel that is currently scrolling
    struct ActiveSpin {
        plan: SpinAnimation,
        started_ms: f64,
    }

    /// DOM presentation: three scrollable columns and a balance footer
    struct DomView {
        root: Element,
        reels: Vec<Element>,
        balance: Element,
        spins: [Option<ActiveSpin>; REEL_COUNT],
    }

    impl DomView {
        fn build(document: &Document) -> Result<Self, JsValue> {
            let body = document.body().ok_or("no body")?;

            let root = document.create_element("div")?;
            root.set_class_name("monarch marble-background");

            let title = document.create_element("h1")?;
            title.set_class_name("fire-text");
            title.set_text_content(Some("MONARCH"));
            root.append_child(&title)?;

            let reel_row = document.create_element("div")?;
            reel_row.set_class_name("reels");
            let mut reels = Vec::with_capacity(REEL_COUNT);
            for _ in 0..REEL_COUNT {
                let column = document.create_element("div")?;
                column.set_class_name("reel large-rows");
                for symbol in Symbol::ALL {
                    let cell = document.create_element("div")?;
                    cell.set_class_name("reel-cell");
                    cell.set_text_content(Some(symbol.glyph()));
                    column.append_child(&cell)?;
                }
                reel_row.append_child(&column)?;
                reels.push(column);
            }
            root.append_child(&reel_row)?;

            let balance = document.create_element("span")?;
            balance.set_class_name("cash-display");
            root.append_child(&balance)?;

            body.append_child(&root)?;

            Ok(Self {
                root,
                reels,
                balance,
                spins: [None, None, None],
            })
        }

        /// Advance scroll positions. Returns true when a spin just finished
        /// and no reel is still moving.
        fn render_frame(&mut self, now_ms: f64) -> bool {
            let mut finished_one = false;
            for (reel, slot) in self.spins.iter_mut().enumerate() {
                let Some(spin) = slot else { continue };
                let column = &self.reels[reel];
                let item_height = column
                    .first_element_child()
                    .map(|row| row.client_height() as f64)
                    .unwrap_or(0.0);
                let max_scroll = (column.scroll_height() - column.client_height()) as f64;
                let elapsed = now_ms - spin.started_ms;

                column.set_scroll_top(spin.plan.scroll_at(elapsed, item_height, max_scroll) as i32);
                if spin.plan.is_finished(elapsed) {
                    *slot = None;
                    finished_one = true;
                }
            }
            finished_one && self.spins.iter().all(Option::is_none)
        }

        fn detach(&self) {
            self.root.remove();
        }
    }

    impl Presentation for DomView {
        fn display(&mut self, reel: usize, _symbol: Symbol, spin: &SpinAnimation) {
            self.spins[reel] = Some(ActiveSpin {
                plan: *spin,
                started_ms: js_sys::Date::now(),
            });
        }

        fn set_winner_visual(&mut self, on: bool) {
            let _ = self.root.class_list().toggle_with_force("winner-flash", on);
        }

        fn render_balance(&mut self, formatted: &str) {
            self.balance.set_text_content(Some(formatted));
        }
    }

    type App = Rc<RefCell<Option<Machine<DomView>>>>;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Monarch starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let view = DomView::build(&document).expect("failed to build reel columns");
        let machine = Machine::new(settings, view, js_sys::Date::now() as u64)
            .expect("stored settings were validated on load");
        let app: App = Rc::new(RefCell::new(Some(machine)));

        setup_teardown(app.clone());
        request_animation_frame(app);

        log::info!("Monarch running!");
    }

    fn request_animation_frame(app: App) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: App) {
        {
            let mut slot = app.borrow_mut();
            // Unmounted: stop the loop
            let Some(machine) = slot.as_mut() else { return };

            let now = js_sys::Date::now();
            for event in machine.advance_to(now as u64) {
                if let RoundEvent::Won { symbol, .. } = event {
                    log::info!("Three {} - winner!", symbol);
                }
            }
            if machine.view_mut().render_frame(now) {
                machine.animation_complete();
            }
        }

        request_animation_frame(app);
    }

    fn setup_teardown(app: App) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(machine) = app.borrow_mut().take() {
                machine.view().detach();
                let (state, stats) = machine.unmount();
                log::info!(
                    "Unmounted at {} after {} rounds",
                    state.balance_display(),
                    stats.rounds
                );
            }
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Safety stop for headless sessions that never run dry
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_TICKS: u32 = 100_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use monarch_reels::sim::{Draw, Machine, RoundEvent, draw_faces};
    use monarch_reels::view::Transcript;
    use monarch_reels::{Settings, format_cents};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Monarch (native) starting...");

    // Optional settings file; headless runs default to instant spins
    let settings = match std::env::args_os().nth(1) {
        Some(path) => match Settings::load_file(std::path::Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}: {}", path.to_string_lossy(), e);
                return std::process::ExitCode::FAILURE;
            }
        },
        None => Settings::instant(),
    };

    let period = settings.tick_period_ms;
    let mut now = settings.first_tick_delay_ms;
    let mut machine = match Machine::new(settings, Transcript::new(), 0) {
        Ok(machine) => machine,
        Err(e) => {
            log::error!("invalid settings: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    // Draw of the round awaiting evaluation
    let mut drawn: Option<(u64, Draw)> = None;

    for _ in 0..MAX_HEADLESS_TICKS {
        for event in machine.advance_to(now) {
            match event {
                RoundEvent::RoundStarted { round, draw } => drawn = Some((round, draw)),
                RoundEvent::Won { round, balance_cents, .. } => {
                    if let Some((_, draw)) = drawn.take().filter(|(r, _)| *r == round) {
                        log::info!(
                            "Round {:>5} {}  WIN  {}",
                            round,
                            draw_faces(&draw),
                            format_cents(balance_cents)
                        );
                    }
                }
                RoundEvent::Lost { round, balance_cents } => {
                    if let Some((_, draw)) = drawn.take().filter(|(r, _)| *r == round) {
                        log::debug!(
                            "Round {:>5} {}       {}",
                            round,
                            draw_faces(&draw),
                            format_cents(balance_cents)
                        );
                    }
                }
                _ => {}
            }
        }
        if machine.is_finished() {
            break;
        }
        now += period;
    }

    let (state, stats) = machine.unmount();
    println!(
        "Final balance {} after {} rounds ({} wins, return ratio {:.3})",
        state.balance_display(),
        stats.rounds,
        stats.wins,
        stats.return_ratio().unwrap_or(0.0)
    );
    std::process::ExitCode::SUCCESS
}
