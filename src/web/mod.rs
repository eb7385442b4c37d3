//! Browser host for the landing page.
//!
//! Built with `--features wasm`. The pure state machines in
//! [`crate::playback`], [`crate::effects`] and [`crate::lead`] do the work;
//! this module wires them to the DOM and the browser's timers.
//!
//! ```javascript
//! import init, { initLanding } from './pkg/chatreel.js';
//! await init();
//! initLanding();
//! ```

mod app;
pub mod dom_target;
mod modal;
mod page;

pub use app::{init_landing, init_landing_with_config};
pub use dom_target::DomTarget;
pub use modal::{close_lead_modal, open_lead_modal};

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::engine::PlayTime;

/// Milliseconds since `origin`, both taken from `Date.now()`.
fn elapsed_since(origin: f64) -> PlayTime {
    PlayTime::from_millis((js_sys::Date::now() - origin).max(0.0) as u64)
}

/// Delay in whole milliseconds from `now` until `deadline`.
fn delay_until(now: PlayTime, deadline: PlayTime) -> u32 {
    u32::try_from(deadline.as_millis().saturating_sub(now.as_millis())).unwrap_or(u32::MAX)
}

fn listen<E, F>(target: &web_sys::EventTarget, event: &str, callback: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
            web_sys::console::warn_1(&err);
        }
    }
}

fn query_all(document: &web_sys::Document, selector: &str) -> Result<Vec<web_sys::Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect())
}

fn set_style(element: &web_sys::Element, property: &str, value: &str) {
    if let Some(el) = element.dyn_ref::<web_sys::HtmlElement>() {
        if let Err(err) = el.style().set_property(property, value) {
            web_sys::console::warn_1(&err);
        }
    }
}

fn media_matches(window: &web_sys::Window, query: &str) -> bool {
    window
        .match_media(query)
        .ok()
        .flatten()
        .is_some_and(|list| list.matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_until_future_deadline() {
        let now = PlayTime::from_millis(1_000);
        assert_eq!(delay_until(now, PlayTime::from_millis(1_018)), 18);
        assert_eq!(delay_until(now, now), 0);
    }

    #[test]
    fn test_delay_until_past_deadline_fires_now() {
        assert_eq!(
            delay_until(PlayTime::from_millis(5_000), PlayTime::from_millis(4_000)),
            0
        );
    }

    #[test]
    fn test_delay_until_clamps_to_timer_range() {
        assert_eq!(
            delay_until(PlayTime::ZERO, PlayTime::from_millis(u64::MAX)),
            u32::MAX
        );
    }
}
