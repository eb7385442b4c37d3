//! Metric counters that count up once when their section scrolls into view.

use serde::{Deserialize, Serialize};

use crate::engine::PlayTime;

/// Cubic ease-out: fast start, soft landing.
///
/// `p` is clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Parse a counter's target attribute the way the page does: optional
/// whitespace and `+`, then leading digits, anything after them ignored.
///
/// Counters only count up from zero, so a negative target is `None`.
#[must_use]
pub fn parse_counter_target(raw: &str) -> Option<u64> {
    let raw = raw.trim_start();
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// A single count-up from zero to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterAnimation {
    /// Final value.
    pub target: u64,
    /// Animation length.
    pub duration_ms: u64,
}

impl CounterAnimation {
    /// Create an animation.
    #[must_use]
    pub const fn new(target: u64, duration_ms: u64) -> Self {
        Self {
            target,
            duration_ms,
        }
    }

    /// Progress in `[0, 1]` after `elapsed_ms`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f64 / self.duration_ms as f64).min(1.0)
    }

    /// Whether the counter has landed on its target.
    #[must_use]
    pub const fn is_complete(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }

    /// Displayed value after `elapsed_ms`.
    ///
    /// Floors the eased value while running and shows exactly `target` once
    /// complete.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn value_at(&self, elapsed_ms: u64) -> u64 {
        if self.is_complete(elapsed_ms) {
            return self.target;
        }
        let eased = self.target as f64 * ease_out_cubic(self.progress(elapsed_ms));
        (eased.floor() as u64).min(self.target)
    }
}

/// All counters of the metrics section, started together exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterGroup {
    counters: Vec<CounterAnimation>,
    started_at: Option<PlayTime>,
}

impl CounterGroup {
    /// Create a group of counters sharing one duration.
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = u64>, duration_ms: u64) -> Self {
        Self {
            counters: targets
                .into_iter()
                .map(|target| CounterAnimation::new(target, duration_ms))
                .collect(),
            started_at: None,
        }
    }

    /// Start the group. Returns `true` only on the first call.
    pub fn trigger(&mut self, now: PlayTime) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Whether [`CounterGroup::trigger`] has fired.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.started_at.is_some()
    }

    /// Number of counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether the group has no counters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Displayed values at `now`, or `None` before the trigger.
    #[must_use]
    pub fn values_at(&self, now: PlayTime) -> Option<Vec<u64>> {
        let started = self.started_at?;
        let elapsed = (now - started).as_millis();
        Some(self.counters.iter().map(|c| c.value_at(elapsed)).collect())
    }

    /// Whether every counter has landed on its target.
    #[must_use]
    pub fn is_settled(&self, now: PlayTime) -> bool {
        self.started_at.is_some_and(|started| {
            let elapsed = (now - started).as_millis();
            self.counters.iter().all(|c| c.is_complete(elapsed))
        })
    }
}
