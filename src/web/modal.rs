//! Lead modal wiring.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlFormElement, HtmlInputElement, KeyboardEvent, RequestMode, Window};

use super::{delay_until, elapsed_since, listen};
use crate::config::LeadConfig;
use crate::engine::PlayTime;
use crate::lead::{
    format_whatsapp, DeliveryFuture, DeliveryOutcome, LeadModal, LeadSubmission, ModalEffect,
    WebhookSink,
};

/// Posts submissions with `fetch` in `no-cors` mode.
///
/// The response is opaque, so any completed request counts as sent.
pub struct FetchSink;

impl WebhookSink for FetchSink {
    fn deliver(&self, url: &str, submission: &LeadSubmission) -> DeliveryFuture {
        let request = Request::post(url)
            .mode(RequestMode::NoCors)
            .header("Content-Type", "application/json")
            .json(submission);
        Box::pin(async move {
            let request = match request {
                Ok(request) => request,
                Err(err) => {
                    tracing::warn!(%err, "could not encode lead submission");
                    return DeliveryOutcome::Failed;
                }
            };
            match request.send().await {
                Ok(_) => DeliveryOutcome::Sent,
                Err(err) => {
                    web_sys::console::error_1(&JsValue::from_str(&format!(
                        "Error submitting lead: {err}"
                    )));
                    DeliveryOutcome::Failed
                }
            }
        })
    }
}

struct ModalElements {
    modal: Element,
    form: HtmlFormElement,
    submit: Element,
    success: Element,
    email: HtmlInputElement,
    whatsapp: HtmlInputElement,
    body: Option<web_sys::HtmlElement>,
}

struct ModalHost {
    modal: LeadModal,
    elements: ModalElements,
    window: Window,
    origin: f64,
    timer: Option<Timeout>,
}

type SharedHost = Rc<RefCell<ModalHost>>;

thread_local! {
    static HOST: RefCell<Option<SharedHost>> = const { RefCell::new(None) };
}

impl ModalHost {
    fn now(&self) -> PlayTime {
        elapsed_since(self.origin)
    }

    fn apply(&self, effect: &ModalEffect) -> Result<(), JsValue> {
        let el = &self.elements;
        match effect {
            ModalEffect::ShowModal => el.modal.class_list().add_1("active"),
            ModalEffect::HideModal => el.modal.class_list().remove_1("active"),
            ModalEffect::LockScroll => el
                .body
                .as_ref()
                .map_or(Ok(()), |body| body.style().set_property("overflow", "hidden")),
            ModalEffect::UnlockScroll => el
                .body
                .as_ref()
                .map_or(Ok(()), |body| body.style().set_property("overflow", "")),
            ModalEffect::SetLoading { loading } => el
                .submit
                .class_list()
                .toggle_with_force("loading", *loading)
                .map(|_| ()),
            ModalEffect::ShowSuccess => {
                el.form.class_list().add_1("hidden")?;
                el.success.class_list().add_1("show")
            }
            ModalEffect::ResetForm => {
                el.form.class_list().remove_1("hidden")?;
                el.success.class_list().remove_1("show")?;
                el.form.reset();
                Ok(())
            }
            ModalEffect::Track {
                event,
                category,
                label,
            } => self.gtag(
                event,
                &[("event_category", category.as_str()), ("event_label", label.as_str())],
            ),
            ModalEffect::Conversion { send_to } => {
                self.gtag("conversion", &[("send_to", send_to.as_str())])
            }
            // Handled by `dispatch`, which owns the shared handle.
            ModalEffect::Post { .. } => Ok(()),
        }
    }

    /// Call `gtag('event', name, params)` when the page loaded the tracker.
    fn gtag(&self, name: &str, params: &[(&str, &str)]) -> Result<(), JsValue> {
        let Ok(gtag) = js_sys::Reflect::get(&self.window, &JsValue::from_str("gtag"))?
            .dyn_into::<js_sys::Function>()
        else {
            tracing::debug!(event = name, "no gtag on page");
            return Ok(());
        };
        let object = js_sys::Object::new();
        for (key, value) in params {
            js_sys::Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(value))?;
        }
        gtag.call3(
            &JsValue::UNDEFINED,
            &JsValue::from_str("event"),
            &JsValue::from_str(name),
            &object,
        )
        .map(|_| ())
    }
}

/// Apply effects, start any POST, and re-arm the timer for the next deadline.
fn dispatch(host: &SharedHost, effects: Vec<ModalEffect>) {
    for effect in effects {
        if let ModalEffect::Post { url, submission } = &effect {
            let host = Rc::clone(host);
            let delivery = FetchSink.deliver(url, submission);
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = delivery.await;
                let effects = {
                    let mut h = host.borrow_mut();
                    let now = h.now();
                    h.modal.submission_finished(now, outcome)
                };
                dispatch(&host, effects);
            });
        } else if let Err(err) = host.borrow().apply(&effect) {
            web_sys::console::warn_1(&err);
        }
    }
    arm_timer(host);
}

fn arm_timer(host: &SharedHost) {
    let mut h = host.borrow_mut();
    let Some(deadline) = h.modal.next_deadline() else {
        h.timer = None;
        return;
    };
    let delay = delay_until(h.now(), deadline);
    let weak = Rc::downgrade(host);
    h.timer = Some(Timeout::new(delay, move || {
        let Some(host) = weak.upgrade() else {
            return;
        };
        let effects = {
            let mut h = host.borrow_mut();
            // Running inside this timeout's own closure; leak it rather than drop it.
            if let Some(fired) = h.timer.take() {
                let _ = fired.forget();
            }
            let now = h.now();
            h.modal.advance_to(now)
        };
        dispatch(&host, effects);
    }));
}

fn with_host(f: impl FnOnce(&mut LeadModal) -> Vec<ModalEffect>) {
    let host = HOST.with(|h| h.borrow().clone());
    if let Some(host) = host {
        let effects = f(&mut host.borrow_mut().modal);
        dispatch(&host, effects);
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn find_elements(document: &Document) -> Option<ModalElements> {
    Some(ModalElements {
        modal: document.get_element_by_id("leadModal")?,
        form: element(document, "leadForm")?,
        submit: document.get_element_by_id("submitBtn")?,
        success: document.get_element_by_id("modalSuccess")?,
        email: element(document, "leadEmail")?,
        whatsapp: element(document, "leadWhatsapp")?,
        body: document.body(),
    })
}

/// Wire the lead modal if the page has one.
pub(super) fn init_lead_modal(window: &Window, document: &Document, config: &LeadConfig) -> Result<(), JsValue> {
    let Some(elements) = find_elements(document) else {
        tracing::debug!("no lead modal on page");
        return Ok(());
    };
    let modal_el = elements.modal.clone();
    let form = elements.form.clone();
    let whatsapp = elements.whatsapp.clone();

    let host = Rc::new(RefCell::new(ModalHost {
        modal: LeadModal::new(config),
        elements,
        window: window.clone(),
        origin: js_sys::Date::now(),
        timer: None,
    }));
    HOST.with(|h| *h.borrow_mut() = Some(Rc::clone(&host)));

    if let Some(close) = document.get_element_by_id("modalClose") {
        listen(&close, "click", |_: web_sys::Event| with_host(LeadModal::close))?;
    }

    let backdrop = modal_el.clone();
    listen(&modal_el, "click", move |e: web_sys::Event| {
        let on_backdrop = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|t| t == backdrop);
        if on_backdrop {
            with_host(LeadModal::backdrop_click);
        }
    })?;

    listen(document, "keydown", |e: KeyboardEvent| {
        if e.key() == "Escape" {
            with_host(LeadModal::escape);
        }
    })?;

    for cta in super::query_all(document, "a[href=\"#cta\"], .nav-cta")? {
        listen(&cta, "click", |e: web_sys::Event| {
            e.prevent_default();
            with_host(LeadModal::open);
        })?;
    }

    {
        let host = Rc::clone(&host);
        listen(&form, "submit", move |e: web_sys::Event| {
            e.prevent_default();
            let effects = {
                let mut h = host.borrow_mut();
                let email = h.elements.email.value();
                let phone = h.elements.whatsapp.value();
                let source = h.window.location().href().unwrap_or_default();
                let now = h.now();
                h.modal.submit(&email, &phone, &source, Utc::now(), now)
            };
            dispatch(&host, effects);
        })?;
    }

    let input = whatsapp.clone();
    listen(&whatsapp, "input", move |_: web_sys::Event| {
        let masked = format_whatsapp(&input.value());
        input.set_value(&masked);
    })
}

/// Open the lead modal - call from JavaScript
#[wasm_bindgen(js_name = openLeadModal)]
pub fn open_lead_modal() {
    with_host(LeadModal::open);
}

/// Close the lead modal - call from JavaScript
#[wasm_bindgen(js_name = closeLeadModal)]
pub fn close_lead_modal() {
    with_host(LeadModal::close);
}
