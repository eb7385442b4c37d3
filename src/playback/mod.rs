//! Conversation playback engine.
//!
//! Plays a deck of canned question/answer exchanges into a [`RenderTarget`],
//! one cycle per scenario, forever:
//!
//! 1. clear the target
//! 2. show the question as an incoming message
//! 3. show a typing indicator for the dwell time
//! 4. reveal the answer one character per tick
//! 5. append the answer timestamp one tick after the last character
//! 6. hold, advance the cursor, repeat
//!
//! The engine never sleeps. Every wait is an event on an
//! [`EventScheduler`]; the host tells the engine what time it is with
//! [`PlaybackEngine::advance_to`] and gets back the time it next needs to be
//! woken. The browser maps that onto `setTimeout`, the terminal onto its frame
//! loop, and tests onto plain integers.
//!
//! # Example
//!
//! ```rust
//! use chatreel::config::LandingConfig;
//! use chatreel::engine::PlayTime;
//! use chatreel::playback::{PlaybackEngine, StartOutcome};
//! use chatreel::playback::transcript::Transcript;
//!
//! let config = LandingConfig::builder().scenario("status?", "ok").build();
//! let mut engine = PlaybackEngine::from_config(&config, Some(Transcript::new()));
//!
//! assert_eq!(engine.start(PlayTime::ZERO), StartOutcome::Started);
//! let wake = engine.advance_to(PlayTime::from_millis(1_000));
//! assert_eq!(wake, Some(PlayTime::from_millis(3_000)));
//! ```

pub mod render;
pub mod scenario;
pub mod transcript;


use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{LabelConfig, LandingConfig, TimingConfig};
use crate::engine::{EventScheduler, PlayTime, PlaybackClock};
use crate::error::{ChatreelResult, RenderError};

use render::{MessageId, MessageSpec, RenderTarget};
use scenario::{RevealUnit, ScenarioDeck};

/// Internal wake-up reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Begin a cycle for the scenario under the cursor.
    ShowScenario,
    /// Dwell over: swap the typing indicator for the text region.
    OpenReveal,
    /// Reveal the next character, or the timestamp after the last one.
    RevealTick,
    /// Hold over: advance the cursor and begin the next cycle.
    Advance,
}

/// Where the engine is within its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not started.
    #[default]
    Idle,
    /// Started, waiting for the kick-off delay.
    AwaitingKickoff,
    /// Typing indicator showing.
    Thinking,
    /// Answer being revealed.
    Revealing,
    /// Answer complete, waiting before the next cycle.
    Holding,
    /// Stopped for good after the target went away or rejected a mutation.
    Halted,
}

/// Result of [`PlaybackEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// First cycle scheduled.
    Started,
    /// A chain is already scheduled; nothing changed.
    AlreadyRunning,
    /// The engine halted earlier and stays stopped.
    Halted,
    /// No render target was supplied; the engine is a permanent no-op.
    NoTarget,
    /// The deck has no scenarios; the engine is a permanent no-op.
    EmptyDeck,
}

/// One processed wake-up, as returned by [`PlaybackEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStep {
    /// Virtual time the step ran at.
    pub time: PlayTime,
    /// What woke the engine.
    pub event: PlaybackEvent,
    /// Cursor after the step.
    pub cursor: usize,
    /// Phase after the step.
    pub phase: Phase,
}

/// Serializable view of engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Current virtual time in milliseconds.
    pub time_ms: u64,
    /// Scenario under the cursor.
    pub cursor: usize,
    /// Cycle phase.
    pub phase: Phase,
    /// Answer characters revealed so far in this cycle.
    pub revealed: usize,
    /// Answer length in reveal ticks.
    pub answer_len: usize,
    /// Cycles fully completed.
    pub cycles_completed: u64,
    /// Next wake-up, if any.
    pub next_deadline_ms: Option<u64>,
}

/// Progress through the current answer.
#[derive(Debug, Clone)]
struct Reveal {
    message: MessageId,
    units: Vec<RevealUnit>,
    next: usize,
}

/// The playback engine.
///
/// Owns its cursor, schedule and clock. The render target is owned too; pass
/// a [`SharedTranscript`](transcript::SharedTranscript) or another cheap
/// handle to keep observing it from outside.
#[derive(Debug)]
pub struct PlaybackEngine<T: RenderTarget> {
    deck: ScenarioDeck,
    timing: TimingConfig,
    labels: LabelConfig,
    target: Option<T>,
    scheduler: EventScheduler<PlaybackEvent>,
    clock: PlaybackClock,
    cursor: usize,
    phase: Phase,
    reveal: Option<Reveal>,
    cycles_completed: u64,
}

impl<T: RenderTarget> PlaybackEngine<T> {
    /// Create an engine.
    ///
    /// Zero tick or hold intervals are raised to 1 ms so virtual time always
    /// moves between cycles.
    #[must_use]
    pub fn new(
        deck: ScenarioDeck,
        timing: TimingConfig,
        labels: LabelConfig,
        target: Option<T>,
    ) -> Self {
        let timing = TimingConfig {
            char_interval_ms: timing.char_interval_ms.max(1),
            hold_ms: timing.hold_ms.max(1),
            ..timing
        };
        Self {
            deck,
            timing,
            labels,
            target,
            scheduler: EventScheduler::new(),
            clock: PlaybackClock::new(),
            cursor: 0,
            phase: Phase::Idle,
            reveal: None,
            cycles_completed: 0,
        }
    }

    /// Create an engine from the terminal section of a landing config.
    #[must_use]
    pub fn from_config(config: &LandingConfig, target: Option<T>) -> Self {
        let terminal = &config.terminal;
        Self::new(
            terminal.deck(),
            terminal.timing,
            terminal.labels.clone(),
            target,
        )
    }

    /// Create an engine from landing config YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the YAML fails to parse or validate.
    pub fn from_yaml(yaml: &str, target: Option<T>) -> ChatreelResult<Self> {
        let config = LandingConfig::from_yaml(yaml)?;
        Ok(Self::from_config(&config, target))
    }

    /// Schedule the first cycle `kickoff_ms` after `now`.
    ///
    /// Only the first successful call has an effect; the engine never runs
    /// two chains.
    pub fn start(&mut self, now: PlayTime) -> StartOutcome {
        if self.target.is_none() {
            debug!("playback start ignored: no render target");
            return StartOutcome::NoTarget;
        }
        if self.deck.is_empty() {
            debug!("playback start ignored: empty deck");
            return StartOutcome::EmptyDeck;
        }
        match self.phase {
            Phase::Idle => {}
            Phase::Halted => return StartOutcome::Halted,
            _ => {
                debug!(phase = ?self.phase, "playback start ignored: already running");
                return StartOutcome::AlreadyRunning;
            }
        }

        let now = self.clock.advance_to(now);
        self.scheduler
            .schedule_after(now, self.timing.kickoff_ms, PlaybackEvent::ShowScenario);
        self.phase = Phase::AwaitingKickoff;
        info!(
            scenarios = self.deck.len(),
            kickoff_ms = self.timing.kickoff_ms,
            "playback started"
        );
        StartOutcome::Started
    }

    /// Run every step due at or before `now`, in order.
    ///
    /// Returns the next wake-up time, or `None` when nothing is scheduled.
    pub fn advance_to(&mut self, now: PlayTime) -> Option<PlayTime> {
        while let Some(scheduled) = self.scheduler.next_before(now) {
            self.clock.advance_to(scheduled.time);
            self.dispatch(scheduled.event);
        }
        self.clock.advance_to(now);
        self.scheduler.next_event_time()
    }

    /// Jump to the next due step and run exactly that step.
    pub fn step(&mut self) -> Option<PlaybackStep> {
        let scheduled = self.scheduler.next()?;
        let time = self.clock.advance_to(scheduled.time);
        self.dispatch(scheduled.event);
        Some(PlaybackStep {
            time,
            event: scheduled.event,
            cursor: self.cursor,
            phase: self.phase,
        })
    }

    /// Advance by `millis` from the current time.
    pub fn run_for(&mut self, millis: u64) -> Option<PlayTime> {
        let until = self.clock.current_time().add_millis(millis);
        self.advance_to(until)
    }

    /// Next wake-up time.
    #[must_use]
    pub fn next_deadline(&self) -> Option<PlayTime> {
        self.scheduler.next_event_time()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> PlayTime {
        self.clock.current_time()
    }

    /// Scenario under the cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Cycles fully completed.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Number of steps processed.
    #[must_use]
    pub const fn steps_processed(&self) -> u64 {
        self.clock.step_count()
    }

    /// Whether a chain is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Halted)
    }

    /// Whether the engine stopped for good.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    /// The scenario deck.
    #[must_use]
    pub const fn deck(&self) -> &ScenarioDeck {
        &self.deck
    }

    /// Effective timings.
    #[must_use]
    pub const fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// The render target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Mutable access to the render target, if any.
    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }

    /// Capture a serializable view of the engine.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let (revealed, answer_len) = self
            .reveal
            .as_ref()
            .map_or((0, 0), |r| (r.next, r.units.len()));
        PlaybackSnapshot {
            time_ms: self.clock.current_time().as_millis(),
            cursor: self.cursor,
            phase: self.phase,
            revealed,
            answer_len,
            cycles_completed: self.cycles_completed,
            next_deadline_ms: self.next_deadline().map(|t| t.as_millis()),
        }
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        self.clock.record_step();
        let attached = self.target.as_ref().is_some_and(|t| t.is_attached());
        if !attached {
            self.halt(&RenderError::Detached);
            return;
        }

        let result = match event {
            PlaybackEvent::ShowScenario => self.show_scenario(),
            PlaybackEvent::OpenReveal => self.open_reveal(),
            PlaybackEvent::RevealTick => self.reveal_tick(),
            PlaybackEvent::Advance => self.advance_cycle(),
        };
        if let Err(err) = result {
            self.halt(&err);
        }
    }

    fn halt(&mut self, reason: &RenderError) {
        warn!(
            %reason,
            cursor = self.cursor,
            at = %self.clock.current_time(),
            "playback halted"
        );
        self.scheduler.clear();
        self.reveal = None;
        self.phase = Phase::Halted;
    }

    fn live_target(&mut self) -> Result<&mut T, RenderError> {
        self.target.as_mut().ok_or(RenderError::Detached)
    }

    fn show_scenario(&mut self) -> Result<(), RenderError> {
        let Some(scenario) = self.deck.get(self.cursor) else {
            return Err(RenderError::Detached);
        };
        let question = MessageSpec::incoming(
            self.labels.incoming_author.as_str(),
            scenario.question.as_str(),
            self.labels.question_time.as_str(),
        );
        let typing = MessageSpec::typing(self.labels.outgoing_author.as_str());
        let units: Vec<RevealUnit> = scenario.reveal_units().collect();

        let target = self.live_target()?;
        target.clear()?;
        target.append_message(&question)?;
        let message = target.append_message(&typing)?;

        debug!(cursor = self.cursor, answer_len = units.len(), "cycle begins");
        self.reveal = Some(Reveal {
            message,
            units,
            next: 0,
        });
        self.phase = Phase::Thinking;
        self.schedule_in(self.timing.dwell_ms, PlaybackEvent::OpenReveal);
        Ok(())
    }

    fn open_reveal(&mut self) -> Result<(), RenderError> {
        let message = self.current_message()?;
        self.live_target()?.open_text_region(message)?;
        self.phase = Phase::Revealing;
        // First character appears as the region opens
        self.reveal_tick()
    }

    fn reveal_tick(&mut self) -> Result<(), RenderError> {
        let Some(reveal) = self.reveal.as_mut() else {
            return Err(RenderError::Detached);
        };
        let message = reveal.message;
        let unit = reveal.units.get(reveal.next).copied();

        match unit {
            Some(unit) => {
                reveal.next += 1;
                let target = self.live_target()?;
                match unit {
                    RevealUnit::Char(ch) => target.push_char(message, ch)?,
                    RevealUnit::LineBreak => target.push_line_break(message)?,
                }
                self.schedule_in(self.timing.char_interval_ms, PlaybackEvent::RevealTick);
            }
            None => {
                let label = self.labels.answer_time.clone();
                self.live_target()?.append_timestamp(message, &label)?;
                self.phase = Phase::Holding;
                debug!(cursor = self.cursor, "answer complete");
                self.schedule_in(self.timing.hold_ms, PlaybackEvent::Advance);
            }
        }
        Ok(())
    }

    fn advance_cycle(&mut self) -> Result<(), RenderError> {
        self.cursor = self.deck.next_index(self.cursor);
        self.cycles_completed += 1;
        self.show_scenario()
    }

    fn current_message(&self) -> Result<MessageId, RenderError> {
        self.reveal
            .as_ref()
            .map(|r| r.message)
            .ok_or(RenderError::Detached)
    }

    fn schedule_in(&mut self, delay_ms: u64, event: PlaybackEvent) {
        let now = self.clock.current_time();
        self.scheduler.schedule_after(now, delay_ms, event);
    }
}
