//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Declarative constraints via `validator`
//! - Runtime semantic validation
//!
//! One YAML file drives every host, so the CLI, the terminal demo and the
//! browser all play the same script with the same timings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ChatreelError, ChatreelResult};
use crate::playback::scenario::{Scenario, ScenarioDeck};

/// Shipped landing page configuration.
pub const EMBEDDED_LANDING_YAML: &str = include_str!("../../demos/landing.yaml");

/// Webhook URL value that means "not configured yet".
pub const WEBHOOK_PLACEHOLDER: &str = "YOUR_GOOGLE_APPS_SCRIPT_URL_HERE";

/// Top-level landing page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LandingConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Terminal demo (playback engine) configuration.
    #[validate(nested)]
    pub terminal: TerminalConfig,

    /// Decorative effect parameters.
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Lead capture configuration.
    #[validate(nested)]
    #[serde(default)]
    pub lead: LeadConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl LandingConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> ChatreelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ChatreelResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        // Poka-Yoke: validate all constraints
        config.validate()?;

        // Additional semantic validation
        config.validate_semantic()?;

        Ok(config)
    }

    /// The shipped configuration with the six ATLAS scenarios.
    ///
    /// Falls back to [`LandingConfig::default`] (no scenarios) if the embedded
    /// file ever fails to parse.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_yaml(EMBEDDED_LANDING_YAML).unwrap_or_else(|err| {
            tracing::warn!(%err, "embedded landing config rejected, using defaults");
            Self::default()
        })
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> LandingConfigBuilder {
        LandingConfigBuilder::default()
    }

    /// Serialize back to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> ChatreelResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> ChatreelResult<()> {
        let effects = &self.effects;
        for (name, value) in [
            ("effects.cursor_ease", effects.cursor_ease),
            ("effects.parallax_speed", effects.parallax_speed),
            ("effects.magnetic_strength", effects.magnetic_strength),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ChatreelError::config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        if !effects.nav_offset_px.is_finite() || effects.nav_offset_px < 0.0 {
            return Err(ChatreelError::config(
                "effects.nav_offset_px must be a non-negative number",
            ));
        }

        if let Some(url) = &self.lead.webhook_url {
            if url != WEBHOOK_PLACEHOLDER
                && !(url.starts_with("https://") || url.starts_with("http://"))
            {
                return Err(ChatreelError::config(format!(
                    "lead.webhook_url must be an http(s) URL, got {url:?}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            terminal: TerminalConfig::default(),
            effects: EffectsConfig::default(),
            lead: LeadConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
///
/// Starts from contract defaults with an empty scenario list.
#[derive(Debug, Default)]
pub struct LandingConfigBuilder {
    config: LandingConfig,
}

impl LandingConfigBuilder {
    /// Append a scenario to the deck.
    #[must_use]
    pub fn scenario(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.config
            .terminal
            .scenarios
            .push(Scenario::new(question, answer));
        self
    }

    /// Replace the whole deck.
    #[must_use]
    pub fn scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.config.terminal.scenarios = scenarios;
        self
    }

    /// Set the playback timings.
    #[must_use]
    pub const fn timing(mut self, timing: TimingConfig) -> Self {
        self.config.terminal.timing = timing;
        self
    }

    /// Set the display labels.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // LabelConfig holds Strings
    pub fn labels(mut self, labels: LabelConfig) -> Self {
        self.config.terminal.labels = labels;
        self
    }

    /// Set the webhook URL.
    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.lead.webhook_url = Some(url.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> LandingConfig {
        self.config
    }
}

/// Terminal demo configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TerminalConfig {
    /// Delays that drive the playback cycle.
    #[validate(nested)]
    #[serde(default)]
    pub timing: TimingConfig,

    /// Fixed display labels.
    #[serde(default)]
    pub labels: LabelConfig,

    /// Scenarios in playback order.
    #[validate(length(min = 1, message = "at least one scenario is required"))]
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl TerminalConfig {
    /// The scenarios as a playback deck.
    #[must_use]
    pub fn deck(&self) -> ScenarioDeck {
        ScenarioDeck::new(self.scenarios.clone())
    }
}

/// Playback delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Delay between host readiness and the first cycle.
    #[serde(default = "default_kickoff_ms")]
    pub kickoff_ms: u64,
    /// How long the typing indicator shows.
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
    /// Interval between revealed characters.
    #[validate(range(min = 1))]
    #[serde(default = "default_char_interval_ms")]
    pub char_interval_ms: u64,
    /// Pause after the timestamp before the next cycle.
    #[validate(range(min = 1))]
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

const fn default_kickoff_ms() -> u64 {
    1_000
}

const fn default_dwell_ms() -> u64 {
    2_000
}

const fn default_char_interval_ms() -> u64 {
    18
}

const fn default_hold_ms() -> u64 {
    5_000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            kickoff_ms: default_kickoff_ms(),
            dwell_ms: default_dwell_ms(),
            char_interval_ms: default_char_interval_ms(),
            hold_ms: default_hold_ms(),
        }
    }
}

impl TimingConfig {
    /// Length of one full cycle for an answer of `reveal_len` characters.
    ///
    /// The first character lands as the dwell ends and the timestamp one tick
    /// after the last, so a cycle is dwell, one interval per character, hold.
    #[must_use]
    pub fn cycle_ms(&self, reveal_len: usize) -> u64 {
        let ticks = reveal_len as u64;
        self.dwell_ms
            .saturating_add(ticks.saturating_mul(self.char_interval_ms))
            .saturating_add(self.hold_ms)
    }
}

/// Fixed display labels.
///
/// The scripted timestamps are literals, not wall-clock times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
    /// Author of the question.
    #[serde(default = "default_incoming_author")]
    pub incoming_author: String,
    /// Author of the answer.
    #[serde(default = "default_outgoing_author")]
    pub outgoing_author: String,
    /// Timestamp shown on the question.
    #[serde(default = "default_question_time")]
    pub question_time: String,
    /// Timestamp appended to the answer.
    #[serde(default = "default_answer_time")]
    pub answer_time: String,
}

fn default_incoming_author() -> String {
    "João".to_string()
}

fn default_outgoing_author() -> String {
    "🤖 ATLAS COPILOT".to_string()
}

fn default_question_time() -> String {
    "14:32".to_string()
}

fn default_answer_time() -> String {
    "14:33".to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            incoming_author: default_incoming_author(),
            outgoing_author: default_outgoing_author(),
            question_time: default_question_time(),
            answer_time: default_answer_time(),
        }
    }
}

/// Decorative effect parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectsConfig {
    /// Fraction of the remaining distance the cursor glow covers per frame.
    #[serde(default = "default_cursor_ease")]
    pub cursor_ease: f64,
    /// Parallax speed of the first floating card.
    #[serde(default = "default_parallax_speed")]
    pub parallax_speed: f64,
    /// How strongly buttons follow the pointer.
    #[serde(default = "default_magnetic_strength")]
    pub magnetic_strength: f64,
    /// Height of the fixed navigation bar.
    #[serde(default = "default_nav_offset_px")]
    pub nav_offset_px: f64,
    /// Duration of the metric counters' count-up.
    #[serde(default = "default_counter_duration_ms")]
    pub counter_duration_ms: u64,
}

const fn default_cursor_ease() -> f64 {
    0.08
}

const fn default_parallax_speed() -> f64 {
    0.05
}

const fn default_magnetic_strength() -> f64 {
    0.15
}

const fn default_nav_offset_px() -> f64 {
    80.0
}

const fn default_counter_duration_ms() -> u64 {
    2_000
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            cursor_ease: default_cursor_ease(),
            parallax_speed: default_parallax_speed(),
            magnetic_strength: default_magnetic_strength(),
            nav_offset_px: default_nav_offset_px(),
            counter_duration_ms: default_counter_duration_ms(),
        }
    }
}

/// Lead capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LeadConfig {
    /// Spreadsheet webhook. Absent or the placeholder disables posting.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// How long the success message shows before the modal closes.
    #[validate(range(min = 1))]
    #[serde(default = "default_success_close_ms")]
    pub success_close_ms: u64,
    /// Delay between closing and resetting the form.
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,    /// Ads conversion target reported after a captured lead.
    #[serde(default)]
    pub conversion_send_to: Option<String>,
}

const fn default_success_close_ms() -> u64 {
    3_000
}

const fn default_reset_delay_ms() -> u64 {
    300
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            success_close_ms: default_success_close_ms(),
            reset_delay_ms: default_reset_delay_ms(),
            conversion_send_to: None,
        }
    }
}
