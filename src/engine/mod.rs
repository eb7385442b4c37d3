//! Virtual-time event loop.
//!
//! Every wait in chatreel is a scheduled one-shot event rather than a
//! blocking sleep. This module provides the pieces hosts and state machines
//! share:
//! - [`PlayTime`]: fixed-point virtual time in milliseconds
//! - [`PlaybackClock`]: monotonic current time
//! - [`EventScheduler`]: deterministic (time, insertion) ordered queue

pub mod clock;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use clock::PlaybackClock;
pub use scheduler::{EventScheduler, ScheduledEvent};

/// Virtual time.
///
/// Integer milliseconds from the host's origin. Browser timers and all
/// configured delays are whole milliseconds, so there is no rounding anywhere
/// in the playback path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PlayTime {
    millis: u64,
}

impl PlayTime {
    /// Time origin.
    pub const ZERO: Self = Self { millis: 0 };

    /// Create time from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Create time from fractional seconds, truncating to whole milliseconds.
    ///
    /// Negative and non-finite inputs clamp to [`PlayTime::ZERO`].
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let millis = (secs * 1_000.0) as u64;
        Self { millis }
    }

    /// Get time as milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.millis as f64 / 1_000.0
    }

    /// Add a duration in milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub const fn add_millis(self, millis: u64) -> Self {
        Self {
            millis: self.millis.saturating_add(millis),
        }
    }

    /// Subtract a duration, saturating at zero.
    #[must_use]
    pub const fn saturating_sub_millis(self, millis: u64) -> Self {
        Self {
            millis: self.millis.saturating_sub(millis),
        }
    }
}

impl std::ops::Add for PlayTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_millis(rhs.millis)
    }
}

impl std::ops::Sub for PlayTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub_millis(rhs.millis)
    }
}

impl std::fmt::Display for PlayTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}s", self.millis / 1_000, self.millis % 1_000)
    }
}

impl From<std::time::Duration> for PlayTime {
    fn from(duration: std::time::Duration) -> Self {
        Self {
            millis: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_time_creation() {
        let t1 = PlayTime::from_secs_f64(1.5);
        let t2 = PlayTime::from_millis(1_500);
        assert_eq!(t1, t2);
        assert!((t1.as_secs_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_play_time_from_bad_secs() {
        assert_eq!(PlayTime::from_secs_f64(-3.0), PlayTime::ZERO);
        assert_eq!(PlayTime::from_secs_f64(f64::NAN), PlayTime::ZERO);
        assert_eq!(PlayTime::from_secs_f64(f64::INFINITY), PlayTime::ZERO);
    }

    #[test]
    fn test_play_time_arithmetic() {
        let t1 = PlayTime::from_millis(1_000);
        let t2 = PlayTime::from_millis(250);

        assert_eq!((t1 + t2).as_millis(), 1_250);
        assert_eq!((t1 - t2).as_millis(), 750);
        // Sub saturates
        assert_eq!((t2 - t1).as_millis(), 0);
    }

    #[test]
    fn test_play_time_add_saturates() {
        let t = PlayTime::from_millis(u64::MAX - 1);
        assert_eq!(t.add_millis(10).as_millis(), u64::MAX);
    }

    #[test]
    fn test_play_time_ordering() {
        let t1 = PlayTime::from_millis(18);
        let t2 = PlayTime::from_millis(36);
        assert!(t1 < t2);
        assert_eq!(t1.max(t2), t2);
    }

    #[test]
    fn test_play_time_display() {
        assert_eq!(PlayTime::from_millis(1_234).to_string(), "1.234s");
        assert_eq!(PlayTime::from_millis(5).to_string(), "0.005s");
        assert_eq!(PlayTime::ZERO.to_string(), "0.000s");
    }

    #[test]
    fn test_play_time_from_duration() {
        let t: PlayTime = std::time::Duration::from_millis(2_000).into();
        assert_eq!(t.as_millis(), 2_000);
    }

    #[test]
    fn test_play_time_serializes_as_integer() {
        let json = serde_json::to_string(&PlayTime::from_millis(42)).expect("serialize");
        assert_eq!(json, "42");
        let back: PlayTime = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, PlayTime::from_millis(42));
    }
}
