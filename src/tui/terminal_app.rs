//! Terminal demo application state and logic.
//!
//! The binary owns the terminal and the wall clock; this type owns the
//! playback engine and turns elapsed frame time into virtual time.

use std::time::Duration;

use crossterm::event::KeyCode;

use crate::config::LandingConfig;
use crate::engine::PlayTime;
use crate::error::ChatreelResult;
use crate::playback::transcript::{SharedTranscript, Transcript};
use crate::playback::{PlaybackEngine, StartOutcome};

/// Fastest playback multiplier.
pub const MAX_SPEED: u64 = 8;

/// Application state for the terminal demo.
pub struct TerminalApp {
    /// Playback engine drawing into `transcript`.
    pub engine: PlaybackEngine<SharedTranscript>,
    /// Handle the UI draws from.
    pub transcript: SharedTranscript,
    /// Config the engine was built from, kept for restarts.
    pub config: LandingConfig,
    /// Whether playback is paused.
    pub paused: bool,
    /// Playback speed multiplier.
    pub speed: u64,
    /// Virtual playback time.
    pub play_time: PlayTime,
    /// Frame counter.
    pub frame_count: u64,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl TerminalApp {
    /// Create the app with the embedded landing config.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(LandingConfig::embedded())
    }

    /// Create from YAML configuration string.
    ///
    /// # Errors
    ///
    /// Returns error if YAML parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ChatreelResult<Self> {
        Ok(Self::from_config(LandingConfig::from_yaml(yaml)?))
    }

    /// Create from a config and start playback at time zero.
    #[must_use]
    pub fn from_config(config: LandingConfig) -> Self {
        let (engine, transcript) = Self::start_engine(&config);
        Self {
            engine,
            transcript,
            config,
            paused: false,
            speed: 1,
            play_time: PlayTime::ZERO,
            frame_count: 0,
            should_quit: false,
        }
    }

    fn start_engine(config: &LandingConfig) -> (PlaybackEngine<SharedTranscript>, SharedTranscript) {
        let transcript = SharedTranscript::new(Transcript::new());
        let mut engine = PlaybackEngine::from_config(config, Some(transcript.clone()));
        if engine.start(PlayTime::ZERO) != StartOutcome::Started {
            tracing::warn!("terminal demo has nothing to play");
        }
        (engine, transcript)
    }

    /// Restart playback from the first scenario.
    pub fn reset(&mut self) {
        let (engine, transcript) = Self::start_engine(&self.config);
        self.engine = engine;
        self.transcript = transcript;
        self.play_time = PlayTime::ZERO;
        self.frame_count = 0;
    }

    /// Advance by one frame that took `elapsed` of wall time.
    pub fn update(&mut self, elapsed: Duration) {
        if self.paused {
            return;
        }
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.play_time = self.play_time.add_millis(millis.saturating_mul(self.speed));
        self.engine.advance_to(self.play_time);
        self.frame_count += 1;
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('+' | '=') => self.speed = (self.speed * 2).min(MAX_SPEED),
            KeyCode::Char('-') => self.speed = (self.speed / 2).max(1),
            _ => {}
        }
    }

    /// Whether the app should quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Animated typing indicator for the current frame.
    #[must_use]
    pub const fn typing_dots(&self) -> &'static str {
        match (self.frame_count / 8) % 3 {
            0 => "●○○",
            1 => "○●○",
            _ => "○○●",
        }
    }

    /// One-line playback status.
    #[must_use]
    pub fn status_line(&self) -> String {
        let deck = self.engine.deck().len();
        format!(
            "Scenario {}/{} | Cycles: {} | Time: {} | Speed: {}x",
            (self.engine.cursor() + 1).min(deck),
            deck,
            self.engine.cycles_completed(),
            self.play_time,
            self.speed
        )
    }
}

impl Default for TerminalApp {
    fn default() -> Self {
        Self::new()
    }
}
