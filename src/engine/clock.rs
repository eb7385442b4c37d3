//! Virtual clock.
//!
//! The clock never ticks on its own. Hosts move it forward to the wall-clock
//! time they observe, and state machines read it when scheduling follow-ups.

use serde::{Deserialize, Serialize};

use crate::engine::PlayTime;

/// Monotonic virtual clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Current virtual time.
    current: PlayTime,
    /// Number of events processed at or before `current`.
    step_count: u64,
}

impl PlaybackClock {
    /// Create a clock at [`PlayTime::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at the given time.
    #[must_use]
    pub const fn starting_at(time: PlayTime) -> Self {
        Self {
            current: time,
            step_count: 0,
        }
    }

    /// Get current virtual time.
    #[must_use]
    pub const fn current_time(&self) -> PlayTime {
        self.current
    }

    /// Get number of processed steps.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Move the clock to `time`.
    ///
    /// Never moves backward: an earlier `time` leaves the clock unchanged.
    /// Returns the resulting current time.
    pub fn advance_to(&mut self, time: PlayTime) -> PlayTime {
        if time > self.current {
            self.current = time;
        }
        self.current
    }

    /// Record that one event was processed.
    pub fn record_step(&mut self) {
        self.step_count += 1;
    }

    /// Time remaining until `target`, zero if it already passed.
    #[must_use]
    pub fn time_until(&self, target: PlayTime) -> PlayTime {
        target - self.current
    }

    /// Reset clock to the origin.
    pub fn reset(&mut self) {
        self.current = PlayTime::ZERO;
        self.step_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = PlaybackClock::new();
        assert_eq!(clock.current_time(), PlayTime::ZERO);
        assert_eq!(clock.step_count(), 0);
    }

    #[test]
    fn test_clock_starting_at() {
        let clock = PlaybackClock::starting_at(PlayTime::from_millis(500));
        assert_eq!(clock.current_time().as_millis(), 500);
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = PlaybackClock::new();
        let now = clock.advance_to(PlayTime::from_millis(1_000));
        assert_eq!(now.as_millis(), 1_000);
        assert_eq!(clock.current_time().as_millis(), 1_000);
    }

    #[test]
    fn test_clock_never_moves_backward() {
        let mut clock = PlaybackClock::new();
        clock.advance_to(PlayTime::from_millis(2_000));
        let now = clock.advance_to(PlayTime::from_millis(1_000));
        assert_eq!(now.as_millis(), 2_000);
    }

    #[test]
    fn test_clock_time_until() {
        let mut clock = PlaybackClock::new();
        clock.advance_to(PlayTime::from_millis(100));

        assert_eq!(clock.time_until(PlayTime::from_millis(118)).as_millis(), 18);
        // Past time returns zero
        assert_eq!(clock.time_until(PlayTime::from_millis(50)), PlayTime::ZERO);
    }

    #[test]
    fn test_clock_record_and_reset() {
        let mut clock = PlaybackClock::new();
        clock.advance_to(PlayTime::from_millis(7));
        clock.record_step();
        clock.record_step();
        assert_eq!(clock.step_count(), 2);

        clock.reset();
        assert_eq!(clock.step_count(), 0);
        assert_eq!(clock.current_time(), PlayTime::ZERO);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Time observed through the clock never decreases.
        #[test]
        fn prop_monotonic(times in proptest::collection::vec(0u64..100_000, 1..50)) {
            let mut clock = PlaybackClock::new();
            let mut last = PlayTime::ZERO;
            for t in times {
                let now = clock.advance_to(PlayTime::from_millis(t));
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
