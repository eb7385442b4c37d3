//! Render target backed by the landing page's terminal element.
//!
//! Builds the same markup the page stylesheet expects:
//!
//! ```html
//! <div class="message outgoing typing">
//!   <span class="message-author">…</span>
//!   <span class="message-text"><span class="typing-indicator">…</span></span>
//!   <span class="message-time">…</span>
//! </div>
//! ```
//!
//! All text goes in through `textContent`, never `innerHTML`.

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::error::RenderError;
use crate::playback::render::{MessageBody, MessageId, MessageSpec, RenderTarget};

struct DomMessage {
    id: MessageId,
    root: Element,
    text: Element,
}

/// DOM-backed [`RenderTarget`].
pub struct DomTarget {
    document: Document,
    container: Element,
    messages: Vec<DomMessage>,
    next_id: u32,
}

fn dom_error(err: &JsValue) -> RenderError {
    RenderError::dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl DomTarget {
    /// Wrap the terminal body element.
    #[must_use]
    pub fn new(document: Document, container: Element) -> Self {
        Self {
            document,
            container,
            messages: Vec::new(),
            next_id: 0,
        }
    }

    /// Find the terminal by CSS selector. `None` if the page has no terminal.
    #[must_use]
    pub fn find(document: &Document, selector: &str) -> Option<Self> {
        let container = document.query_selector(selector).ok().flatten()?;
        Some(Self::new(document.clone(), container))
    }

    fn span(&self, class: &str, text: Option<&str>) -> Result<Element, RenderError> {
        let span = self
            .document
            .create_element("span")
            .map_err(|e| dom_error(&e))?;
        span.set_class_name(class);
        if let Some(text) = text {
            span.set_text_content(Some(text));
        }
        Ok(span)
    }

    fn typing_indicator(&self) -> Result<Element, RenderError> {
        let indicator = self.span("typing-indicator", None)?;
        for _ in 0..3 {
            let dot = self
                .document
                .create_element("span")
                .map_err(|e| dom_error(&e))?;
            indicator.append_child(&dot).map_err(|e| dom_error(&e))?;
        }
        Ok(indicator)
    }

    fn message(&self, id: MessageId) -> Result<&DomMessage, RenderError> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .ok_or(RenderError::UnknownMessage(id))
    }
}

impl RenderTarget for DomTarget {
    fn is_attached(&self) -> bool {
        self.container.is_connected()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.container.set_text_content(None);
        self.messages.clear();
        Ok(())
    }

    fn append_message(&mut self, spec: &MessageSpec) -> Result<MessageId, RenderError> {
        let root = self
            .document
            .create_element("div")
            .map_err(|e| dom_error(&e))?;

        let author = self.span("message-author", Some(spec.author.as_str()))?;
        let text = match &spec.body {
            MessageBody::Text(body) => {
                let text = self.span("message-text", None)?;
                for (i, line) in body.split('\n').enumerate() {
                    if i > 0 {
                        let br = self.document.create_element("br").map_err(|e| dom_error(&e))?;
                        text.append_child(&br).map_err(|e| dom_error(&e))?;
                    }
                    text.append_with_str_1(line).map_err(|e| dom_error(&e))?;
                }
                root.set_class_name(&format!("message {}", spec.kind.css_class()));
                text
            }
            MessageBody::TypingIndicator => {
                let text = self.span("message-text", None)?;
                let indicator = self.typing_indicator()?;
                text.append_child(&indicator).map_err(|e| dom_error(&e))?;
                root.set_class_name(&format!("message {} typing", spec.kind.css_class()));
                text
            }
        };

        root.append_child(&author).map_err(|e| dom_error(&e))?;
        root.append_child(&text).map_err(|e| dom_error(&e))?;
        if let Some(time) = &spec.time {
            let time = self.span("message-time", Some(time.as_str()))?;
            root.append_child(&time).map_err(|e| dom_error(&e))?;
        }
        self.container
            .append_child(&root)
            .map_err(|e| dom_error(&e))?;

        let id = MessageId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        tracing::trace!(id = id.raw(), kind = spec.kind.css_class(), "message appended");
        self.messages.push(DomMessage { id, root, text });
        Ok(id)
    }

    fn open_text_region(&mut self, id: MessageId) -> Result<(), RenderError> {
        let message = self.message(id)?;
        message.text.set_text_content(None);
        message
            .root
            .class_list()
            .remove_1("typing")
            .map_err(|e| dom_error(&e))
    }

    fn push_char(&mut self, id: MessageId, ch: char) -> Result<(), RenderError> {
        let mut buf = [0u8; 4];
        self.message(id)?
            .text
            .append_with_str_1(ch.encode_utf8(&mut buf))
            .map_err(|e| dom_error(&e))
    }

    fn push_line_break(&mut self, id: MessageId) -> Result<(), RenderError> {
        let br = self
            .document
            .create_element("br")
            .map_err(|e| dom_error(&e))?;
        self.message(id)?
            .text
            .append_child(&br)
            .map(|_| ())
            .map_err(|e| dom_error(&e))
    }

    fn append_timestamp(&mut self, id: MessageId, label: &str) -> Result<(), RenderError> {
        let time = self.span("message-time", Some(label))?;
        self.message(id)?
            .root
            .append_child(&time)
            .map(|_| ())
            .map_err(|e| dom_error(&e))
    }
}
