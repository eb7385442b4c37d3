//! Error types for chatreel.
//!
//! Configuration and I/O failures are real errors and propagate as
//! [`ChatreelResult`]. Failures inside playback are decorative: the engine
//! logs them and halts, it never surfaces them to a visitor.

use thiserror::Error;

use crate::playback::render::MessageId;

/// Result type alias for chatreel operations.
pub type ChatreelResult<T> = Result<T, ChatreelError>;

/// Unified error type for chatreel operations.
#[derive(Debug, Error)]
pub enum ChatreelError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Declarative validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Playback Errors =====
    /// Render target failure.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl ChatreelError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error came from configuration loading.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::YamlParse(_) | Self::Validation(_)
        )
    }
}

impl From<serde_json::Error> for ChatreelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failures of a [`RenderTarget`](crate::playback::render::RenderTarget).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The container is no longer part of its document.
    #[error("render target detached")]
    Detached,

    /// The message handle does not refer to a live message.
    #[error("unknown message {0:?}")]
    UnknownMessage(MessageId),

    /// The host rejected a mutation.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl RenderError {
    /// Create a DOM error from any displayable host error.
    #[must_use]
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = ChatreelError::config("no scenarios");
        assert!(err.to_string().contains("no scenarios"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let bad: Result<serde_yaml::Value, _> = serde_yaml::from_str("{{{{not yaml");
        let err: ChatreelError = bad.expect_err("invalid yaml").into();
        assert!(err.to_string().starts_with("YAML parsing error"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yaml");
        let err: ChatreelError = io.into();
        assert!(err.to_string().contains("missing.yaml"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ChatreelError = bad.expect_err("invalid json").into();
        assert!(matches!(err, ChatreelError::Serialization(_)));
    }

    #[test]
    fn test_render_error_display() {
        assert_eq!(RenderError::Detached.to_string(), "render target detached");
        assert_eq!(
            RenderError::UnknownMessage(MessageId::new(3)).to_string(),
            "unknown message MessageId(3)"
        );
        let err: ChatreelError = RenderError::dom("appendChild failed").into();
        assert!(err.to_string().contains("appendChild failed"));
    }
}
