//! Page entry point and terminal playback driver.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;

use super::dom_target::DomTarget;
use super::{delay_until, elapsed_since, modal, page};
use crate::config::LandingConfig;
use crate::engine::PlayTime;
use crate::playback::{PlaybackEngine, StartOutcome};

/// Selector of the fake terminal's message area.
const TERMINAL_SELECTOR: &str = ".terminal-body";

struct TerminalDriver {
    engine: PlaybackEngine<DomTarget>,
    origin: f64,
}

impl TerminalDriver {
    fn now(&self) -> PlayTime {
        elapsed_since(self.origin)
    }
}

/// Arm one timeout for the engine's next deadline.
///
/// Each wake-up advances to the wall clock and re-arms for whatever the
/// engine scheduled next. Returns quietly once the engine stops scheduling.
fn schedule_wake(driver: &Rc<RefCell<TerminalDriver>>, deadline: Option<PlayTime>) {
    let Some(deadline) = deadline else {
        tracing::debug!("terminal playback stopped");
        return;
    };
    let delay = delay_until(driver.borrow().now(), deadline);
    let driver = Rc::clone(driver);
    Timeout::new(delay, move || {
        let next = {
            let mut d = driver.borrow_mut();
            let now = d.now();
            d.engine.advance_to(now)
        };
        schedule_wake(&driver, next);
    })
    .forget();
}

fn start_terminal(document: &web_sys::Document, config: &LandingConfig) {
    let Some(target) = DomTarget::find(document, TERMINAL_SELECTOR) else {
        tracing::debug!("no terminal on page");
        return;
    };
    let mut engine = PlaybackEngine::from_config(config, Some(target));
    let origin = js_sys::Date::now();
    match engine.start(PlayTime::ZERO) {
        StartOutcome::Started => {
            let deadline = engine.next_deadline();
            let driver = Rc::new(RefCell::new(TerminalDriver { engine, origin }));
            schedule_wake(&driver, deadline);
        }
        outcome => tracing::warn!(?outcome, "terminal playback not started"),
    }
}

fn log_banner() {
    web_sys::console::log_2(
        &JsValue::from_str("%c🤖 ATLAS COPILOT"),
        &JsValue::from_str("font-size: 24px; font-weight: bold; color: #10b981;"),
    );
    web_sys::console::log_2(
        &JsValue::from_str("%cWhatsApp AI Copilot"),
        &JsValue::from_str("font-size: 14px; color: #6ee7b7;"),
    );
}

fn init_with(config: &LandingConfig) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    start_terminal(&document, config);
    page::init_scroll_animations(&document, &config.effects)?;
    page::init_nav_highlight(&document)?;
    page::init_smooth_scroll(&window, &document, &config.effects)?;
    page::init_parallax(&window, &document, &config.effects)?;
    page::init_magnetic_buttons(&document, &config.effects)?;
    page::init_feature_cards(&document)?;
    page::init_cursor_glow(&window, &document, &config.effects)?;
    page::apply_reduced_motion(&window, &document);
    modal::init_lead_modal(&window, &document, &config.lead)?;

    log_banner();
    Ok(())
}

/// Initialize the landing page with the embedded config - call from JavaScript
#[wasm_bindgen(js_name = initLanding)]
pub fn init_landing() -> Result<(), JsValue> {
    init_with(&LandingConfig::embedded())
}

/// Initialize the landing page from a YAML config string.
///
/// # Errors
///
/// Rejects configs that fail to parse or validate.
#[wasm_bindgen(js_name = initLandingWithConfig)]
pub fn init_landing_with_config(yaml: &str) -> Result<(), JsValue> {
    let config = LandingConfig::from_yaml(yaml).map_err(|e| JsValue::from_str(&e.to_string()))?;
    init_with(&config)
}
