//! Event scheduler with deterministic ordering.
//!
//! Implements a priority queue that ensures:
//! - Events are processed in time order
//! - Ties are broken by insertion order (sequence number)
//! - Reproducible across runs and hosts

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::engine::PlayTime;

/// A scheduled event with time and sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent<E> {
    /// Scheduled time.
    pub time: PlayTime,
    /// Sequence number for deterministic tie-breaking.
    pub sequence: u64,
    /// The event payload.
    pub event: E,
}

impl<E> ScheduledEvent<E> {
    /// Create a new scheduled event.
    #[must_use]
    pub const fn new(time: PlayTime, sequence: u64, event: E) -> Self {
        Self {
            time,
            sequence,
            event,
        }
    }
}

// Ordering ignores the payload: min-heap by time, then sequence
impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.time.cmp(&other.time) {
            std::cmp::Ordering::Equal => self.sequence.cmp(&other.sequence),
            ord => ord,
        }
    }
}

/// Priority-ordered event queue.
///
/// Ensures deterministic processing order:
/// 1. Events are sorted by time
/// 2. Ties are broken by sequence number (insertion order)
///
/// # Example
///
/// ```rust
/// use chatreel::engine::scheduler::EventScheduler;
/// use chatreel::engine::PlayTime;
///
/// let mut scheduler = EventScheduler::new();
/// scheduler.schedule(PlayTime::from_millis(2_000), "reveal");
/// scheduler.schedule(PlayTime::from_millis(1_000), "show");
///
/// assert_eq!(scheduler.next().map(|e| e.event), Some("show"));
/// ```
#[derive(Debug)]
pub struct EventScheduler<E> {
    /// Min-heap ordered by (time, sequence).
    queue: BinaryHeap<Reverse<ScheduledEvent<E>>>,
    /// Monotonic sequence counter for tie-breaking.
    sequence: u64,
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            sequence: 0,
        }
    }
}

impl<E> EventScheduler<E> {
    /// Create a new event scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at the given time.
    pub fn schedule(&mut self, time: PlayTime, event: E) {
        let seq = self.sequence;
        self.sequence += 1;

        self.queue.push(Reverse(ScheduledEvent::new(time, seq, event)));
    }

    /// Schedule an event `delay_ms` after `now`.
    pub fn schedule_after(&mut self, now: PlayTime, delay_ms: u64, event: E) {
        self.schedule(now.add_millis(delay_ms), event);
    }

    /// Get the next event (removes from queue).
    #[must_use]
    #[allow(clippy::should_implement_trait)] // Not an Iterator, different semantics
    pub fn next(&mut self) -> Option<ScheduledEvent<E>> {
        self.queue.pop().map(|Reverse(e)| e)
    }

    /// Peek at the next event without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&ScheduledEvent<E>> {
        self.queue.peek().map(|Reverse(e)| e)
    }

    /// Get the next event if its time is before or at the given time.
    #[must_use]
    pub fn next_before(&mut self, time: PlayTime) -> Option<ScheduledEvent<E>> {
        if self.next_event_time().is_some_and(|t| t <= time) {
            return self.next();
        }
        None
    }

    /// Get all events up to and including the given time.
    #[must_use]
    pub fn drain_until(&mut self, time: PlayTime) -> Vec<ScheduledEvent<E>> {
        let mut events = Vec::new();

        while let Some(event) = self.next_before(time) {
            events.push(event);
        }

        events
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get the number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Clear all pending events.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Get the time of the next event, if any.
    #[must_use]
    pub fn next_event_time(&self) -> Option<PlayTime> {
        self.peek().map(|e| e.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> PlayTime {
        PlayTime::from_millis(ms)
    }

    #[test]
    fn test_scheduler_time_ordering() {
        let mut scheduler = EventScheduler::new();

        // Schedule events out of order
        scheduler.schedule(at(3_000), 3);
        scheduler.schedule(at(1_000), 1);
        scheduler.schedule(at(2_000), 2);

        let order: Vec<i32> = std::iter::from_fn(|| scheduler.next().map(|e| e.event)).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_scheduler_sequence_ordering() {
        let mut scheduler = EventScheduler::new();

        let time = at(18);
        scheduler.schedule(time, 'a');
        scheduler.schedule(time, 'b');
        scheduler.schedule(time, 'c');

        // Same instant: insertion order
        let order: String = std::iter::from_fn(|| scheduler.next().map(|e| e.event)).collect();
        assert_eq!(order, "abc");
    }

    #[test]
    fn test_scheduler_schedule_after() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_after(at(1_000), 2_000, ());
        assert_eq!(scheduler.next_event_time(), Some(at(3_000)));
    }

    #[test]
    fn test_scheduler_next_before() {
        let mut scheduler = EventScheduler::new();

        scheduler.schedule(at(1_000), 1);
        scheduler.schedule(at(2_000), 2);
        scheduler.schedule(at(3_000), 3);

        let e1 = scheduler.next_before(at(1_500));
        assert_eq!(e1.map(|e| e.event), Some(1));

        // No more events before 1.5s
        assert!(scheduler.next_before(at(1_500)).is_none());

        // Inclusive bound
        assert_eq!(scheduler.next_before(at(2_000)).map(|e| e.event), Some(2));
    }

    #[test]
    fn test_scheduler_drain_until() {
        let mut scheduler = EventScheduler::new();

        for i in 1..=5 {
            scheduler.schedule(at(i * 100), i);
        }

        let events = scheduler.drain_until(at(300));
        assert_eq!(events.len(), 3);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_scheduler_peek() {
        let mut scheduler = EventScheduler::new();

        assert!(scheduler.peek().is_none());

        scheduler.schedule(at(1_000), "x");

        // Peek doesn't remove
        assert!(scheduler.peek().is_some());
        assert_eq!(scheduler.len(), 1);

        let _ = scheduler.next();
        assert!(scheduler.peek().is_none());
    }

    #[test]
    fn test_scheduler_clear() {
        let mut scheduler = EventScheduler::new();

        for i in 1..=10 {
            scheduler.schedule(at(i), i);
        }
        assert_eq!(scheduler.len(), 10);

        scheduler.clear();

        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_event_time(), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Events always come out sorted by (time, insertion order).
        #[test]
        fn prop_deterministic_order(times in proptest::collection::vec(0u64..1_000, 0..64)) {
            let mut scheduler = EventScheduler::new();
            for (i, t) in times.iter().enumerate() {
                scheduler.schedule(PlayTime::from_millis(*t), i);
            }

            let mut expected: Vec<(u64, usize)> =
                times.iter().copied().enumerate().map(|(i, t)| (t, i)).collect();
            expected.sort_unstable();

            let actual: Vec<(u64, usize)> = std::iter::from_fn(|| scheduler.next())
                .map(|e| (e.time.as_millis(), e.event))
                .collect();

            prop_assert_eq!(actual, expected);
        }
    }
}
