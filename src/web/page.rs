//! Decorative page effects: scroll reveal, counters, nav highlight,
//! anchor scrolling, parallax, magnetic buttons and the cursor glow.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MouseEvent, ScrollBehavior, ScrollToOptions, Window,
};

use super::{elapsed_since, listen, media_matches, query_all, request_animation_frame, set_style};
use crate::config::EffectsConfig;
use crate::effects::{
    anchor_id, is_active_link, magnetic_offset, parallax_offset, parse_counter_target,
    scroll_target, CounterGroup, CursorGlow, Point, Rect, REDUCED_MOTION_VARS,
};

const STAGGER_GRIDS: &str = ".features-grid, .use-cases-grid, .metrics-grid, .commands-grid";
const COUNTER_SELECTOR: &str = ".metric-number[data-target]";

type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn observer<F>(root_margin: &str, threshold: f64, mut on_visible: F) -> Result<IntersectionObserver, JsValue>
where
    F: FnMut(&Element) + 'static,
{
    let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, _: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.is_intersecting() {
                on_visible(&entry.target());
            }
        }
    }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_root_margin(root_margin);
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();
    Ok(observer)
}

/// Counters count up once, the first time the metrics section is shown.
struct Counters {
    elements: Vec<Element>,
    group: CounterGroup,
    origin: f64,
}

fn counters(document: &Document, duration_ms: u64) -> Result<Counters, JsValue> {
    let mut elements = Vec::new();
    let mut targets = Vec::new();
    for el in query_all(document, COUNTER_SELECTOR)? {
        if let Some(target) = el
            .get_attribute("data-target")
            .as_deref()
            .and_then(parse_counter_target)
        {
            elements.push(el);
            targets.push(target);
        }
    }
    Ok(Counters {
        elements,
        group: CounterGroup::new(targets, duration_ms),
        origin: js_sys::Date::now(),
    })
}

fn run_counters(counters: &Rc<RefCell<Counters>>) {
    let frame: FrameLoop = Rc::new(RefCell::new(None));
    let next = Rc::clone(&frame);
    let counters = Rc::clone(counters);
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let c = counters.borrow();
        let now = elapsed_since(c.origin);
        if let Some(values) = c.group.values_at(now) {
            for (el, value) in c.elements.iter().zip(values) {
                el.set_text_content(Some(&value.to_string()));
            }
        }
        if !c.group.is_settled(now) {
            if let Some(f) = next.borrow().as_ref() {
                request_animation_frame(f);
            }
        }
    }) as Box<dyn FnMut()>));

    let first = frame.borrow();
    if let Some(f) = first.as_ref() {
        request_animation_frame(f);
    }
}

/// Fade sections in as they scroll into view; start counters with the metrics.
pub(super) fn init_scroll_animations(document: &Document, effects: &EffectsConfig) -> Result<(), JsValue> {
    for section in query_all(document, "section")? {
        section.set_attribute("data-animate", "")?;
    }
    for grid in query_all(document, STAGGER_GRIDS)? {
        grid.set_attribute("data-animate-stagger", "")?;
    }

    let counters = Rc::new(RefCell::new(counters(document, effects.counter_duration_ms)?));
    let observer = observer("0px 0px -100px 0px", 0.1, move |target| {
        if let Err(err) = target.class_list().add_1("visible") {
            web_sys::console::warn_1(&err);
        }
        if target.class_list().contains("metrics") {
            let triggered = {
                let mut c = counters.borrow_mut();
                let now = elapsed_since(c.origin);
                c.group.trigger(now)
            };
            if triggered {
                run_counters(&counters);
            }
        }
    })?;

    for el in query_all(document, "[data-animate], [data-animate-stagger]")? {
        observer.observe(&el);
    }
    Ok(())
}

/// Highlight the nav link of the section crossing the middle of the viewport.
pub(super) fn init_nav_highlight(document: &Document) -> Result<(), JsValue> {
    let links = query_all(document, ".nav-link")?;
    let observer = observer("-50% 0px -50% 0px", 0.0, move |section| {
        let id = section.id();
        for link in &links {
            let active = link
                .get_attribute("href")
                .is_some_and(|href| is_active_link(&href, &id));
            if let Err(err) = link.class_list().toggle_with_force("active", active) {
                web_sys::console::warn_1(&err);
            }
        }
    })?;

    for section in query_all(document, "section[id]")? {
        observer.observe(&section);
    }
    Ok(())
}

/// Smooth-scroll in-page links below the fixed nav and record the fragment.
pub(super) fn init_smooth_scroll(
    window: &Window,
    document: &Document,
    effects: &EffectsConfig,
) -> Result<(), JsValue> {
    let nav_offset = effects.nav_offset_px;
    for anchor in query_all(document, "a[href^=\"#\"]")? {
        let Some(href) = anchor.get_attribute("href") else {
            continue;
        };
        let window = window.clone();
        let document = document.clone();
        listen(&anchor, "click", move |e: web_sys::Event| {
            e.prevent_default();
            let Some(id) = anchor_id(&href) else {
                return;
            };
            let Some(target) = document.get_element_by_id(id) else {
                return;
            };
            let top = scroll_target(
                target.get_bounding_client_rect().top(),
                window.scroll_y().unwrap_or(0.0),
                nav_offset,
            );
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);

            if let Ok(history) = window.history() {
                if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(&href)) {
                    web_sys::console::warn_1(&err);
                }
            }
        })?;
    }
    Ok(())
}

/// Move floating cards at increasing speeds as the page scrolls.
pub(super) fn init_parallax(
    window: &Window,
    document: &Document,
    effects: &EffectsConfig,
) -> Result<(), JsValue> {
    let cards = Rc::new(query_all(document, ".floating-card")?);
    if cards.is_empty() {
        return Ok(());
    }
    let speed = effects.parallax_speed;
    let ticking = Rc::new(Cell::new(false));

    let frame: FrameLoop = Rc::new(RefCell::new(None));
    {
        let window = window.clone();
        let ticking = Rc::clone(&ticking);
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            for (index, card) in cards.iter().enumerate() {
                let y = parallax_offset(scroll_y, speed, index);
                set_style(card, "transform", &format!("translateY({y}px)"));
            }
            ticking.set(false);
        }) as Box<dyn FnMut()>));
    }

    listen(window, "scroll", move |_: web_sys::Event| {
        if !ticking.replace(true) {
            if let Some(f) = frame.borrow().as_ref() {
                request_animation_frame(f);
            }
        }
    })
}

/// Buttons lean toward the pointer while it hovers them.
pub(super) fn init_magnetic_buttons(document: &Document, effects: &EffectsConfig) -> Result<(), JsValue> {
    let strength = effects.magnetic_strength;
    for button in query_all(document, ".btn-primary, .nav-cta")? {
        let el = button.clone();
        listen(&button, "mousemove", move |e: MouseEvent| {
            let r = el.get_bounding_client_rect();
            let rect = Rect {
                left: r.left(),
                top: r.top(),
                width: r.width(),
                height: r.height(),
            };
            let pointer = Point::new(f64::from(e.client_x()), f64::from(e.client_y()));
            let offset = magnetic_offset(&rect, pointer, strength);
            set_style(&el, "transform", &format!("translate({}px, {}px)", offset.x, offset.y));
        })?;

        let el = button.clone();
        listen(&button, "mouseleave", move |_: MouseEvent| {
            set_style(&el, "transform", "");
        })?;
    }
    Ok(())
}

/// Tilt a feature card's icon while hovered.
pub(super) fn init_feature_cards(document: &Document) -> Result<(), JsValue> {
    for card in query_all(document, ".feature-card")? {
        for (event, transform) in [("mouseenter", "scale(1.1) rotate(5deg)"), ("mouseleave", "")] {
            let el = card.clone();
            listen(&card, event, move |_: MouseEvent| {
                if let Ok(Some(icon)) = el.query_selector(".feature-icon") {
                    set_style(&icon, "transform", transform);
                }
            })?;
        }
    }
    Ok(())
}

/// Soft glow trailing the pointer. Skipped on touch-only devices.
pub(super) fn init_cursor_glow(
    window: &Window,
    document: &Document,
    effects: &EffectsConfig,
) -> Result<(), JsValue> {
    let Some(el) = document.get_element_by_id("cursorGlow") else {
        return Ok(());
    };
    if !media_matches(window, "(hover: hover)") {
        return Ok(());
    }

    let glow = Rc::new(RefCell::new(CursorGlow::new(effects.cursor_ease)));
    let frame: FrameLoop = Rc::new(RefCell::new(None));
    {
        let glow = Rc::clone(&glow);
        let el = el.clone();
        let next = Rc::clone(&frame);
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(p) = glow.borrow_mut().frame() else {
                return;
            };
            set_style(&el, "left", &format!("{}px", p.x));
            set_style(&el, "top", &format!("{}px", p.y));
            if let Some(f) = next.borrow().as_ref() {
                request_animation_frame(f);
            }
        }) as Box<dyn FnMut()>));
    }

    {
        let glow = Rc::clone(&glow);
        let el = el.clone();
        listen(document, "mousemove", move |e: MouseEvent| {
            let started = glow
                .borrow_mut()
                .pointer_moved(f64::from(e.client_x()), f64::from(e.client_y()));
            if started {
                if let Err(err) = el.class_list().add_1("active") {
                    web_sys::console::warn_1(&err);
                }
                if let Some(f) = frame.borrow().as_ref() {
                    request_animation_frame(f);
                }
            }
        })?;
    }

    listen(document, "mouseleave", move |_: MouseEvent| {
        glow.borrow_mut().pointer_left();
        if let Err(err) = el.class_list().remove_1("active") {
            web_sys::console::warn_1(&err);
        }
    })
}

/// Drop transition durations when the visitor asks for less motion.
pub(super) fn apply_reduced_motion(window: &Window, document: &Document) {
    if !media_matches(window, "(prefers-reduced-motion: reduce)") {
        return;
    }
    if let Some(root) = document.document_element() {
        for var in REDUCED_MOTION_VARS {
            set_style(&root, var, "none");
        }
    }
}
