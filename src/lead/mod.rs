//! Lead capture: the signup modal, its phone mask and the webhook payload.
//!
//! The modal is a small state machine on the same virtual clock as the
//! playback engine. Every operation returns the [`ModalEffect`]s the host has
//! to apply to the page, so the logic runs identically in the browser and in
//! tests.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::config::{LeadConfig, WEBHOOK_PLACEHOLDER};
use crate::engine::{EventScheduler, PlayTime, PlaybackClock};
use crate::error::ChatreelResult;

/// Longest phone number the mask accepts (area code plus nine digits).
pub const MAX_PHONE_DIGITS: usize = 11;

/// Analytics category of every modal event.
pub const LEAD_EVENT_CATEGORY: &str = "lead_capture";

/// Format a Brazilian phone number as it is typed.
///
/// Non-digits are dropped and input is capped at eleven digits, then shown
/// progressively as `(DD`, `(DD) NNNNN` and `(DD) NNNNN-NNNN`.
#[must_use]
pub fn format_whatsapp(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_DIGITS)
        .collect();

    match digits.len() {
        0 => String::new(),
        1..=2 => format!("({digits}"),
        3..=7 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

/// Payload posted to the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    /// Visitor's email, trimmed.
    pub email: String,
    /// Visitor's phone, trimmed, possibly empty.
    pub whatsapp: String,
    /// Submission time, RFC 3339 UTC with milliseconds.
    pub timestamp: String,
    /// Page URL the form was sent from.
    pub source: String,
}

impl LeadSubmission {
    /// Build a submission. `None` if the trimmed email is empty.
    #[must_use]
    pub fn new(email: &str, whatsapp: &str, source: &str, at: DateTime<Utc>) -> Option<Self> {
        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_string(),
            whatsapp: whatsapp.trim().to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: source.to_string(),
        })
    }

    /// JSON request body.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> ChatreelResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Where submissions go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookTarget {
    /// Not configured; submissions are acknowledged without posting.
    Disabled,
    /// Post to this URL.
    Url(String),
}

impl WebhookTarget {
    /// Resolve the configured webhook.
    #[must_use]
    pub fn from_config(config: &LeadConfig) -> Self {
        match config.webhook_url.as_deref().map(str::trim) {
            None | Some("" | WEBHOOK_PLACEHOLDER) => Self::Disabled,
            Some(url) => Self::Url(url.to_string()),
        }
    }

    /// URL to post to, if enabled.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Disabled => None,
            Self::Url(url) => Some(url),
        }
    }
}

/// How a delivery attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The request went out. The response is opaque, so this is all we know.
    Sent,
    /// No webhook configured.
    Skipped,
    /// The request could not be sent.
    Failed,
}

/// Future returned by [`WebhookSink::deliver`].
pub type DeliveryFuture = Pin<Box<dyn Future<Output = DeliveryOutcome>>>;

/// Best-effort transport for lead submissions.
pub trait WebhookSink {
    /// Post `submission` to `url`. Never retried.
    fn deliver(&self, url: &str, submission: &LeadSubmission) -> DeliveryFuture;
}

/// Visible state of the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalState {
    /// Hidden.
    Closed,
    /// Showing the form.
    Open,
    /// Showing the form with the submit button loading.
    Submitting,
    /// Showing the thank-you message.
    Success,
}

/// Page mutation the host must apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ModalEffect {
    /// Add the `active` class to the modal.
    ShowModal,
    /// Remove the `active` class from the modal.
    HideModal,
    /// Stop the page behind the modal from scrolling.
    LockScroll,
    /// Restore page scrolling.
    UnlockScroll,
    /// Toggle the submit button's loading state.
    SetLoading {
        /// New state.
        loading: bool,
    },
    /// Hide the form and show the thank-you message.
    ShowSuccess,
    /// Show the form again, hide the thank-you message and clear inputs.
    ResetForm,
    /// Report an analytics event. Skipped when the page has no tracker.
    Track {
        /// Event name.
        event: String,
        /// Event category.
        category: String,
        /// Event label.
        label: String,
    },
    /// Report an ad conversion. Skipped when the page has no tracker.
    Conversion {
        /// Conversion target.
        send_to: String,
    },
    /// Send the payload.
    Post {
        /// Webhook URL.
        url: String,
        /// Request body.
        submission: LeadSubmission,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormState {
    Editing,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalTimer {
    AutoClose,
    ResetForm,
}

/// Lead capture modal.
#[derive(Debug)]
pub struct LeadModal {
    visible: bool,
    form: FormState,
    webhook: WebhookTarget,
    success_close_ms: u64,
    reset_delay_ms: u64,
    conversion_send_to: Option<String>,
    pending_email: Option<String>,
    timers: EventScheduler<ModalTimer>,
    clock: PlaybackClock,
}

impl ModalEffect {
    fn track(event: &str, label: &str) -> Self {
        Self::Track {
            event: event.to_string(),
            category: LEAD_EVENT_CATEGORY.to_string(),
            label: label.to_string(),
        }
    }
}

impl LeadModal {
    /// Create a closed modal.
    #[must_use]
    pub fn new(config: &LeadConfig) -> Self {
        Self {
            visible: false,
            form: FormState::Editing,
            webhook: WebhookTarget::from_config(config),
            success_close_ms: config.success_close_ms,
            reset_delay_ms: config.reset_delay_ms,
            conversion_send_to: config
                .conversion_send_to
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            pending_email: None,
            timers: EventScheduler::new(),
            clock: PlaybackClock::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ModalState {
        if !self.visible {
            return ModalState::Closed;
        }
        match self.form {
            FormState::Editing => ModalState::Open,
            FormState::Submitting => ModalState::Submitting,
            FormState::Succeeded => ModalState::Success,
        }
    }

    /// Whether the modal is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.visible
    }

    /// Resolved webhook.
    #[must_use]
    pub const fn webhook(&self) -> &WebhookTarget {
        &self.webhook
    }

    /// Next timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<PlayTime> {
        self.timers.next_event_time()
    }

    /// Show the modal.
    pub fn open(&mut self) -> Vec<ModalEffect> {
        if self.visible {
            return Vec::new();
        }
        self.visible = true;
        debug!("lead modal opened");
        vec![
            ModalEffect::ShowModal,
            ModalEffect::LockScroll,
            ModalEffect::track("modal_open", "lead_modal"),
        ]
    }

    /// Hide the modal.
    pub fn close(&mut self) -> Vec<ModalEffect> {
        if !self.visible {
            return Vec::new();
        }
        self.visible = false;
        vec![ModalEffect::HideModal, ModalEffect::UnlockScroll]
    }

    /// Escape key pressed anywhere on the page.
    pub fn escape(&mut self) -> Vec<ModalEffect> {
        self.close()
    }

    /// Click on the dimmed backdrop around the dialog.
    pub fn backdrop_click(&mut self) -> Vec<ModalEffect> {
        self.close()
    }

    /// Submit the form.
    ///
    /// Ignored unless the form is editable and the email is non-blank. With no
    /// webhook configured the submission succeeds at once.
    pub fn submit(
        &mut self,
        email: &str,
        whatsapp: &str,
        source: &str,
        at: DateTime<Utc>,
        now: PlayTime,
    ) -> Vec<ModalEffect> {
        if self.form != FormState::Editing {
            return Vec::new();
        }
        let Some(submission) = LeadSubmission::new(email, whatsapp, source, at) else {
            debug!("lead submit ignored: blank email");
            return Vec::new();
        };

        self.form = FormState::Submitting;
        self.pending_email = Some(submission.email.clone());
        let mut effects = vec![ModalEffect::SetLoading { loading: true }];
        match self.webhook.url() {
            Some(url) => effects.push(ModalEffect::Post {
                url: url.to_string(),
                submission,
            }),
            None => effects.extend(self.submission_finished(now, DeliveryOutcome::Skipped)),
        }
        effects
    }

    /// The POST settled.
    ///
    /// The thank-you message shows regardless of `outcome`. Only a lead that
    /// went out or was skipped is tracked and closes the modal by itself.
    pub fn submission_finished(&mut self, now: PlayTime, outcome: DeliveryOutcome) -> Vec<ModalEffect> {
        if self.form != FormState::Submitting {
            return Vec::new();
        }
        let now = self.clock.advance_to(now);
        self.form = FormState::Succeeded;
        let email = self.pending_email.take().unwrap_or_default();

        let mut effects = Vec::new();
        if outcome == DeliveryOutcome::Failed {
            warn!("lead submission could not be sent");
        } else {
            effects.push(ModalEffect::track("lead_captured", &email));
            if let Some(send_to) = &self.conversion_send_to {
                effects.push(ModalEffect::Conversion {
                    send_to: send_to.clone(),
                });
            }
            self.timers
                .schedule_after(now, self.success_close_ms, ModalTimer::AutoClose);
        }
        effects.push(ModalEffect::ShowSuccess);
        effects.push(ModalEffect::SetLoading { loading: false });
        effects
    }

    /// Fire every timer due at or before `now`.
    pub fn advance_to(&mut self, now: PlayTime) -> Vec<ModalEffect> {
        let mut effects = Vec::new();
        while let Some(scheduled) = self.timers.next_before(now) {
            let at = self.clock.advance_to(scheduled.time);
            self.clock.record_step();
            match scheduled.event {
                ModalTimer::AutoClose => {
                    effects.extend(self.close());
                    self.timers
                        .schedule_after(at, self.reset_delay_ms, ModalTimer::ResetForm);
                }
                ModalTimer::ResetForm => {
                    self.form = FormState::Editing;
                    effects.push(ModalEffect::ResetForm);
                }
            }
        }
        self.clock.advance_to(now);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 14, 32, 7)
            .single()
            .unwrap_or_default()
    }

    fn config(url: Option<&str>) -> LeadConfig {
        LeadConfig {
            webhook_url: url.map(str::to_string),
            ..LeadConfig::default()
        }
    }

    #[test]
    fn test_format_whatsapp_progressive() {
        assert_eq!(format_whatsapp(""), "");
        assert_eq!(format_whatsapp("4"), "(4");
        assert_eq!(format_whatsapp("48"), "(48");
        assert_eq!(format_whatsapp("489"), "(48) 9");
        assert_eq!(format_whatsapp("4899912"), "(48) 99912");
        assert_eq!(format_whatsapp("48999123"), "(48) 99912-3");
        assert_eq!(format_whatsapp("48999123456"), "(48) 99912-3456");
    }

    #[test]
    fn test_format_whatsapp_strips_and_caps() {
        assert_eq!(format_whatsapp("(48) 99912-3456"), "(48) 99912-3456");
        assert_eq!(format_whatsapp("+55 48 99912 3456"), "(55) 48999-1234");
        assert_eq!(format_whatsapp("abc"), "");
        assert_eq!(format_whatsapp("4899912345678"), "(48) 99912-3456");
    }

    #[test]
    fn test_submission_trims_and_stamps() {
        let submission =
            LeadSubmission::new("  joao@example.com ", " (48) 9 ", "https://atlas.test/", at());
        let submission = submission.expect("valid email");
        assert_eq!(submission.email, "joao@example.com");
        assert_eq!(submission.whatsapp, "(48) 9");
        assert_eq!(submission.timestamp, "2025-01-15T14:32:07.000Z");

        let json = submission.to_json().expect("json");
        assert!(json.contains("\"email\":\"joao@example.com\""));
        assert!(json.contains("\"source\":\"https://atlas.test/\""));
    }

    #[test]
    fn test_submission_requires_email() {
        assert!(LeadSubmission::new("   ", "48", "", at()).is_none());
    }

    #[test]
    fn test_webhook_target() {
        assert_eq!(WebhookTarget::from_config(&config(None)), WebhookTarget::Disabled);
        assert_eq!(
            WebhookTarget::from_config(&config(Some(WEBHOOK_PLACEHOLDER))),
            WebhookTarget::Disabled
        );
        let target = WebhookTarget::from_config(&config(Some("https://hook.test/exec")));
        assert_eq!(target.url(), Some("https://hook.test/exec"));
    }

    #[test]
    fn test_open_close_escape_backdrop() {
        let mut modal = LeadModal::new(&config(None));
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(modal.escape().is_empty());

        assert_eq!(
            modal.open(),
            vec![
                ModalEffect::ShowModal,
                ModalEffect::LockScroll,
                ModalEffect::Track {
                    event: "modal_open".into(),
                    category: "lead_capture".into(),
                    label: "lead_modal".into(),
                },
            ]
        );
        assert!(modal.open().is_empty());
        assert_eq!(modal.state(), ModalState::Open);

        assert_eq!(
            modal.escape(),
            vec![ModalEffect::HideModal, ModalEffect::UnlockScroll]
        );
        assert!(!modal.is_open());

        modal.open();
        assert_eq!(modal.backdrop_click().len(), 2);
        assert!(modal.close().is_empty());
    }

    #[test]
    fn test_submit_posts_then_auto_closes() {
        let mut modal = LeadModal::new(&config(Some("https://hook.test/exec")));
        modal.open();

        let effects = modal.submit("a@b.co", "", "https://atlas.test/", at(), PlayTime::from_millis(100));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], ModalEffect::SetLoading { loading: true });
        assert!(matches!(&effects[1], ModalEffect::Post { url, .. } if url == "https://hook.test/exec"));
        assert_eq!(modal.state(), ModalState::Submitting);

        // Double submit while in flight is ignored
        assert!(modal
            .submit("a@b.co", "", "", at(), PlayTime::from_millis(150))
            .is_empty());

        let effects = modal.submission_finished(PlayTime::from_millis(400), DeliveryOutcome::Sent);
        assert_eq!(
            effects,
            vec![
                ModalEffect::Track {
                    event: "lead_captured".into(),
                    category: "lead_capture".into(),
                    label: "a@b.co".into(),
                },
                ModalEffect::ShowSuccess,
                ModalEffect::SetLoading { loading: false },
            ]
        );
        assert_eq!(modal.state(), ModalState::Success);
        assert_eq!(modal.next_deadline(), Some(PlayTime::from_millis(3_400)));

        assert!(modal.advance_to(PlayTime::from_millis(3_399)).is_empty());
        assert_eq!(
            modal.advance_to(PlayTime::from_millis(3_400)),
            vec![ModalEffect::HideModal, ModalEffect::UnlockScroll]
        );
        assert_eq!(modal.next_deadline(), Some(PlayTime::from_millis(3_700)));
        assert_eq!(
            modal.advance_to(PlayTime::from_millis(3_700)),
            vec![ModalEffect::ResetForm]
        );

        modal.open();
        assert_eq!(modal.state(), ModalState::Open);
    }

    #[test]
    fn test_submit_without_webhook_succeeds_immediately() {
        let mut modal = LeadModal::new(&config(Some(WEBHOOK_PLACEHOLDER)));
        modal.open();
        let effects = modal.submit("a@b.co", "", "", at(), PlayTime::ZERO);
        assert_eq!(
            effects,
            vec![
                ModalEffect::SetLoading { loading: true },
                ModalEffect::Track {
                    event: "lead_captured".into(),
                    category: "lead_capture".into(),
                    label: "a@b.co".into(),
                },
                ModalEffect::ShowSuccess,
                ModalEffect::SetLoading { loading: false },
            ]
        );
        let effects = modal.advance_to(PlayTime::from_millis(3_300));
        assert_eq!(
            effects,
            vec![
                ModalEffect::HideModal,
                ModalEffect::UnlockScroll,
                ModalEffect::ResetForm,
            ]
        );
    }

    #[test]
    fn test_failed_post_still_shows_success() {
        let mut modal = LeadModal::new(&config(Some("https://hook.test/exec")));
        modal.open();
        modal.submit("a@b.co", "", "", at(), PlayTime::ZERO);

        let effects = modal.submission_finished(PlayTime::from_millis(10), DeliveryOutcome::Failed);
        assert!(effects.contains(&ModalEffect::ShowSuccess));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, ModalEffect::Track { .. } | ModalEffect::Conversion { .. })));
        assert_eq!(modal.state(), ModalState::Success);
        assert_eq!(modal.next_deadline(), None);
    }

    #[test]
    fn test_captured_lead_reports_conversion() {
        let mut modal = LeadModal::new(&LeadConfig {
            webhook_url: Some("https://hook.test/exec".into()),
            conversion_send_to: Some("AW-1/abc".into()),
            ..LeadConfig::default()
        });
        modal.open();
        modal.submit(" ana@b.co ", "", "", at(), PlayTime::ZERO);

        let effects = modal.submission_finished(PlayTime::from_millis(20), DeliveryOutcome::Sent);
        assert_eq!(
            &effects[..2],
            &[
                ModalEffect::Track {
                    event: "lead_captured".into(),
                    category: LEAD_EVENT_CATEGORY.into(),
                    label: "ana@b.co".into(),
                },
                ModalEffect::Conversion {
                    send_to: "AW-1/abc".into(),
                },
            ]
        );
    }

    #[test]
    fn test_blank_conversion_target_is_ignored() {
        let mut modal = LeadModal::new(&LeadConfig {
            conversion_send_to: Some("  ".into()),
            ..LeadConfig::default()
        });
        modal.open();
        let effects = modal.submit("a@b.co", "", "", at(), PlayTime::ZERO);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, ModalEffect::Conversion { .. })));
    }

    #[test]
    fn test_blank_email_is_ignored() {
        let mut modal = LeadModal::new(&config(None));
        modal.open();
        assert!(modal.submit("  ", "48", "", at(), PlayTime::ZERO).is_empty());
        assert_eq!(modal.state(), ModalState::Open);
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let mut modal = LeadModal::new(&config(None));
        assert!(modal
            .submission_finished(PlayTime::ZERO, DeliveryOutcome::Sent)
            .is_empty());
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Rc<RefCell<Vec<(String, LeadSubmission)>>>,
    }

    impl WebhookSink for RecordingSink {
        fn deliver(&self, url: &str, submission: &LeadSubmission) -> DeliveryFuture {
            self.calls
                .borrow_mut()
                .push((url.to_string(), submission.clone()));
            Box::pin(std::future::ready(DeliveryOutcome::Sent))
        }
    }

    #[test]
    fn test_post_effect_feeds_sink() {
        let sink = RecordingSink::default();
        let mut modal = LeadModal::new(&config(Some("https://hook.test/exec")));
        modal.open();

        for effect in modal.submit("a@b.co", "48999123456", "src", at(), PlayTime::ZERO) {
            if let ModalEffect::Post { url, submission } = effect {
                drop(sink.deliver(&url, &submission));
            }
        }
        let calls = sink.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.whatsapp, "48999123456");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_mask_idempotent(raw in ".{0,30}") {
                let once = format_whatsapp(&raw);
                prop_assert_eq!(format_whatsapp(&once), once.clone());
                prop_assert!(once.chars().filter(char::is_ascii_digit).count() <= MAX_PHONE_DIGITS);
            }
        }
    }
}
