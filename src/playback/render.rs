//! The seam between the playback engine and whatever displays it.
//!
//! The engine only ever talks to a [`RenderTarget`]. The browser host backs it
//! with DOM nodes, the terminal host and the tests with a
//! [`Transcript`](crate::playback::transcript::Transcript).

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Handle to a message inside a render target.
///
/// Handles are only meaningful to the target that issued them and only until
/// its next [`RenderTarget::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    /// Wrap a raw handle.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Direction of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// From the visitor (the question).
    Incoming,
    /// From the assistant (the answer).
    Outgoing,
}

impl MessageKind {
    /// CSS modifier class used by the landing page stylesheet.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

/// Initial content of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageBody {
    /// Fully rendered text. Newlines render as line breaks.
    Text(String),
    /// Animated "typing" placeholder.
    TypingIndicator,
}

/// Everything a target needs to insert one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    /// Direction.
    pub kind: MessageKind,
    /// Display author label.
    pub author: String,
    /// Initial body.
    pub body: MessageBody,
    /// Display timestamp, if known up front.
    pub time: Option<String>,
}

impl MessageSpec {
    /// A finished incoming message.
    #[must_use]
    pub fn incoming(author: impl Into<String>, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Incoming,
            author: author.into(),
            body: MessageBody::Text(text.into()),
            time: Some(time.into()),
        }
    }

    /// An outgoing message that starts as a typing indicator.
    #[must_use]
    pub fn typing(author: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Outgoing,
            author: author.into(),
            body: MessageBody::TypingIndicator,
            time: None,
        }
    }
}

/// A container the playback engine owns while it runs.
///
/// Every mutating call may fail; the engine halts on the first failure.
pub trait RenderTarget {
    /// Whether the container is still present in its document.
    fn is_attached(&self) -> bool;

    /// Remove every message.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the mutation.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Append a message and return its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the mutation.
    fn append_message(&mut self, spec: &MessageSpec) -> Result<MessageId, RenderError>;

    /// Replace a typing indicator with an empty text region.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownMessage`] for a stale handle.
    fn open_text_region(&mut self, id: MessageId) -> Result<(), RenderError>;

    /// Append one visible character to a message's text region.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownMessage`] for a stale handle.
    fn push_char(&mut self, id: MessageId, ch: char) -> Result<(), RenderError>;

    /// Append a line break to a message's text region.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownMessage`] for a stale handle.
    fn push_line_break(&mut self, id: MessageId) -> Result<(), RenderError>;

    /// Append a timestamp label after the text region.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownMessage`] for a stale handle.
    fn append_timestamp(&mut self, id: MessageId, label: &str) -> Result<(), RenderError>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for Box<T> {
    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        (**self).clear()
    }

    fn append_message(&mut self, spec: &MessageSpec) -> Result<MessageId, RenderError> {
        (**self).append_message(spec)
    }

    fn open_text_region(&mut self, id: MessageId) -> Result<(), RenderError> {
        (**self).open_text_region(id)
    }

    fn push_char(&mut self, id: MessageId, ch: char) -> Result<(), RenderError> {
        (**self).push_char(id, ch)
    }

    fn push_line_break(&mut self, id: MessageId) -> Result<(), RenderError> {
        (**self).push_line_break(id)
    }

    fn append_timestamp(&mut self, id: MessageId, label: &str) -> Result<(), RenderError> {
        (**self).append_timestamp(id, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind_css_class() {
        assert_eq!(MessageKind::Incoming.css_class(), "incoming");
        assert_eq!(MessageKind::Outgoing.css_class(), "outgoing");
    }

    #[test]
    fn test_incoming_spec() {
        let spec = MessageSpec::incoming("João", "status?", "14:32");
        assert_eq!(spec.kind, MessageKind::Incoming);
        assert_eq!(spec.body, MessageBody::Text("status?".to_string()));
        assert_eq!(spec.time.as_deref(), Some("14:32"));
    }

    #[test]
    fn test_typing_spec_has_no_time() {
        let spec = MessageSpec::typing("bot");
        assert_eq!(spec.kind, MessageKind::Outgoing);
        assert_eq!(spec.body, MessageBody::TypingIndicator);
        assert!(spec.time.is_none());
    }

    #[test]
    fn test_spec_serialization() {
        let json = serde_json::to_string(&MessageSpec::typing("bot")).expect("serialize");
        assert!(json.contains("\"outgoing\""));
        assert!(json.contains("\"typing_indicator\""));
    }

    #[test]
    fn test_message_id_raw() {
        assert_eq!(MessageId::new(9).raw(), 9);
    }
}
