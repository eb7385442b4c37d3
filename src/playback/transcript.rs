//! In-memory render target.
//!
//! A [`Transcript`] mirrors what the browser would show: the live messages of
//! the current cycle, each with its author, revealed text and timestamp. With
//! recording enabled it also keeps an operation log and the list of questions
//! shown, which is what the property tests inspect.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::Write as _;
use std::rc::Rc;

use crate::error::RenderError;
use crate::playback::render::{MessageBody, MessageId, MessageKind, MessageSpec, RenderTarget};
use crate::playback::scenario::RevealUnit;

/// Body of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderedBody {
    /// Typing indicator still showing.
    Typing,
    /// Text region, in reveal order.
    Text(Vec<RevealUnit>),
}

/// One message as currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    /// Handle issued by the transcript.
    pub id: MessageId,
    /// Direction.
    pub kind: MessageKind,
    /// Author label.
    pub author: String,
    /// Current body.
    pub body: RenderedBody,
    /// Timestamp label, once appended.
    pub time: Option<String>,
}

impl RenderedMessage {
    /// Whether the typing indicator is showing.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        matches!(self.body, RenderedBody::Typing)
    }

    /// Number of revealed units, line breaks included.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        match &self.body {
            RenderedBody::Typing => 0,
            RenderedBody::Text(units) => units.len(),
        }
    }

    /// Text with line breaks as `'\n'`.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.render_units("\n")
    }

    /// Text with line breaks as `<br>`, the way the page shows it.
    #[must_use]
    pub fn markup(&self) -> String {
        self.render_units("<br>")
    }

    fn render_units(&self, line_break: &str) -> String {
        let RenderedBody::Text(units) = &self.body else {
            return String::new();
        };
        let mut out = String::with_capacity(units.len());
        for unit in units {
            match unit {
                RevealUnit::Char(ch) => out.push(*ch),
                RevealUnit::LineBreak => out.push_str(line_break),
            }
        }
        out
    }
}

/// A single mutation, as recorded in the operation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    /// Container cleared.
    Clear,
    /// Message appended.
    Append {
        /// New handle.
        id: MessageId,
        /// Direction.
        kind: MessageKind,
    },
    /// Typing indicator replaced by an empty region.
    OpenText {
        /// Target message.
        id: MessageId,
    },
    /// Character or line break revealed.
    Reveal {
        /// Target message.
        id: MessageId,
        /// What was added.
        unit: RevealUnit,
    },
    /// Timestamp appended.
    Timestamp {
        /// Target message.
        id: MessageId,
        /// Label text.
        label: String,
    },
}

/// In-memory render target.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<RenderedMessage>,
    next_id: u32,
    attached: bool,
    clear_count: u64,
    recording: bool,
    ops: Vec<RenderOp>,
    questions: Vec<String>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create an attached transcript that keeps only the live messages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 0,
            attached: true,
            clear_count: 0,
            recording: false,
            ops: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Create a transcript that also logs every operation and question.
    #[must_use]
    pub fn recording() -> Self {
        Self {
            recording: true,
            ..Self::new()
        }
    }

    /// Live messages of the current cycle.
    #[must_use]
    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    /// Look up a live message.
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&RenderedMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The most recent outgoing message, if any.
    #[must_use]
    pub fn last_outgoing(&self) -> Option<&RenderedMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Outgoing)
    }

    /// How many times the container was cleared.
    #[must_use]
    pub const fn clear_count(&self) -> u64 {
        self.clear_count
    }

    /// Operation log (empty unless recording).
    #[must_use]
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Every incoming question shown, in order (empty unless recording).
    #[must_use]
    pub fn questions_shown(&self) -> &[String] {
        &self.questions
    }

    /// Simulate removal of the container from its document.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Plain-text rendering of the live messages.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            let arrow = match message.kind {
                MessageKind::Incoming => "<",
                MessageKind::Outgoing => ">",
            };
            let _ = writeln!(out, "{arrow} {}", message.author);
            if message.is_typing() {
                out.push_str("  ...\n");
            } else {
                for line in message.plain_text().split('\n') {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            if let Some(time) = &message.time {
                let _ = writeln!(out, "  [{time}]");
            }
        }
        out
    }

    fn record(&mut self, op: RenderOp) {
        if self.recording {
            self.ops.push(op);
        }
    }

    fn ensure_attached(&self) -> Result<(), RenderError> {
        if self.attached {
            Ok(())
        } else {
            Err(RenderError::Detached)
        }
    }

    fn message_mut(&mut self, id: MessageId) -> Result<&mut RenderedMessage, RenderError> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RenderError::UnknownMessage(id))
    }

    fn reveal(&mut self, id: MessageId, unit: RevealUnit) -> Result<(), RenderError> {
        self.ensure_attached()?;
        let message = self.message_mut(id)?;
        if message.is_typing() {
            message.body = RenderedBody::Text(Vec::new());
        }
        if let RenderedBody::Text(units) = &mut message.body {
            units.push(unit);
        }
        self.record(RenderOp::Reveal { id, unit });
        Ok(())
    }
}

impl RenderTarget for Transcript {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.ensure_attached()?;
        self.messages.clear();
        self.clear_count += 1;
        self.record(RenderOp::Clear);
        Ok(())
    }

    fn append_message(&mut self, spec: &MessageSpec) -> Result<MessageId, RenderError> {
        self.ensure_attached()?;
        let id = MessageId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let body = match &spec.body {
            MessageBody::Text(text) => RenderedBody::Text(text.chars().map(RevealUnit::from).collect()),
            MessageBody::TypingIndicator => RenderedBody::Typing,
        };
        if self.recording && spec.kind == MessageKind::Incoming {
            if let MessageBody::Text(text) = &spec.body {
                self.questions.push(text.clone());
            }
        }

        self.messages.push(RenderedMessage {
            id,
            kind: spec.kind,
            author: spec.author.clone(),
            body,
            time: spec.time.clone(),
        });
        self.record(RenderOp::Append { id, kind: spec.kind });
        Ok(id)
    }

    fn open_text_region(&mut self, id: MessageId) -> Result<(), RenderError> {
        self.ensure_attached()?;
        self.message_mut(id)?.body = RenderedBody::Text(Vec::new());
        self.record(RenderOp::OpenText { id });
        Ok(())
    }

    fn push_char(&mut self, id: MessageId, ch: char) -> Result<(), RenderError> {
        self.reveal(id, RevealUnit::from(ch))
    }

    fn push_line_break(&mut self, id: MessageId) -> Result<(), RenderError> {
        self.reveal(id, RevealUnit::LineBreak)
    }

    fn append_timestamp(&mut self, id: MessageId, label: &str) -> Result<(), RenderError> {
        self.ensure_attached()?;
        self.message_mut(id)?.time = Some(label.to_string());
        self.record(RenderOp::Timestamp {
            id,
            label: label.to_string(),
        });
        Ok(())
    }
}

/// A [`Transcript`] several owners can point at.
///
/// Hosts keep one handle to draw from while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript(Rc<RefCell<Transcript>>);

impl SharedTranscript {
    /// Wrap a transcript.
    #[must_use]
    pub fn new(transcript: Transcript) -> Self {
        Self(Rc::new(RefCell::new(transcript)))
    }

    /// Borrow the transcript.
    ///
    /// # Panics
    ///
    /// Panics if the transcript is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Transcript> {
        self.0.borrow()
    }

    /// Mutably borrow the transcript.
    ///
    /// # Panics
    ///
    /// Panics if the transcript is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Transcript> {
        self.0.borrow_mut()
    }
}

impl RenderTarget for SharedTranscript {
    fn is_attached(&self) -> bool {
        self.0.borrow().is_attached()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.0.borrow_mut().clear()
    }

    fn append_message(&mut self, spec: &MessageSpec) -> Result<MessageId, RenderError> {
        self.0.borrow_mut().append_message(spec)
    }

    fn open_text_region(&mut self, id: MessageId) -> Result<(), RenderError> {
        self.0.borrow_mut().open_text_region(id)
    }

    fn push_char(&mut self, id: MessageId, ch: char) -> Result<(), RenderError> {
        self.0.borrow_mut().push_char(id, ch)
    }

    fn push_line_break(&mut self, id: MessageId) -> Result<(), RenderError> {
        self.0.borrow_mut().push_line_break(id)
    }

    fn append_timestamp(&mut self, id: MessageId, label: &str) -> Result<(), RenderError> {
        self.0.borrow_mut().append_timestamp(id, label)
    }
}
