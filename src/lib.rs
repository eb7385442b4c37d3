//! # chatreel
//!
//! Scripted chat-terminal playback for landing pages.
//!
//! A fake conversation cycles through question/answer scenarios: the question
//! appears, a typing indicator "thinks", the answer types out one character
//! at a time, and after a pause the next scenario replaces it. Everything is
//! driven by a virtual millisecond clock, so the same config always produces
//! the same timeline whether it runs in a browser, a terminal, or a test.
//!
//! Alongside the engine live the page's smaller state machines: metric
//! counters, cursor glow, parallax and anchor scrolling helpers, and the
//! lead capture modal.
//!
//! ## Example
//!
//! ```rust
//! use chatreel::prelude::*;
//!
//! let config = LandingConfig::builder()
//!     .scenario("How many orders today?", "42 orders.")
//!     .build();
//!
//! let transcript = SharedTranscript::new(Transcript::new());
//! let mut engine = PlaybackEngine::from_config(&config, Some(transcript.clone()));
//! engine.start(PlayTime::ZERO);
//! engine.run_for(5_000);
//!
//! assert!(transcript.borrow().render_text().contains("42 orders."));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod lead;
pub mod playback;
pub mod tui;

#[cfg(feature = "wasm")]
pub mod web;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{LandingConfig, LandingConfigBuilder, TimingConfig};
    pub use crate::engine::{EventScheduler, PlayTime, PlaybackClock};
    pub use crate::error::{ChatreelError, ChatreelResult, RenderError};
    pub use crate::lead::{LeadModal, LeadSubmission, ModalEffect};
    pub use crate::playback::render::{MessageId, MessageKind, MessageSpec, RenderTarget};
    pub use crate::playback::scenario::{Scenario, ScenarioDeck};
    pub use crate::playback::transcript::{SharedTranscript, Transcript};
    pub use crate::playback::{Phase, PlaybackEngine, StartOutcome};
}

/// Re-export for public API
pub use error::{ChatreelError, ChatreelResult};
