//! # Lifecycle events emitted by the poller.
//!
//! The [`EventKind`] enum names the six fixed channels; [`Event`] carries the
//! payload each channel is defined with:
//!
//! | Channel   | Payload            |
//! |-----------|--------------------|
//! | `start`   | [`TrackingTime`]   |
//! | `second`  | [`TrackingTime`]   |
//! | `success` | `P` (task payload) |
//! | `error`   | [`TaskError`]      |
//! | `timeout` | none               |
//! | `close`   | none               |
//!
//! ## Example
//! ```rust
//! use taskpoll::{Event, EventKind, TrackingTime};
//!
//! let ev: Event<String> = Event::Second(TrackingTime::new(1, 29));
//! assert_eq!(ev.kind(), EventKind::Second);
//! assert_eq!(ev.tracking(), Some(TrackingTime::new(1, 29)));
//! ```

use std::fmt;

use crate::error::TaskError;

/// Progress toward the configured timeout, in whole seconds.
///
/// Each tick produces a new value; a published value is never mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TrackingTime {
    /// Seconds elapsed since `start()`.
    pub passed: u64,
    /// Seconds left until the timeout fires.
    pub remaining: u64,
}

impl TrackingTime {
    /// Creates a tracking value.
    #[inline]
    pub const fn new(passed: u64, remaining: u64) -> Self {
        Self { passed, remaining }
    }

    /// Tracking value at the beginning of a run: nothing passed, everything remaining.
    #[inline]
    pub const fn initial(total: u64) -> Self {
        Self::new(0, total)
    }

    /// Value for the next one-second tick of a run lasting `total` seconds.
    #[inline]
    pub fn tick(self, total: u64) -> Self {
        let passed = self.passed.saturating_add(1);
        Self::new(passed, total.saturating_sub(passed))
    }
}

impl fmt::Display for TrackingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s passed, {}s remaining", self.passed, self.remaining)
    }
}

/// Event channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Run started. Published synchronously by `start()`.
    Start,
    /// One more second of the run elapsed.
    Second,
    /// Task reported completion via `done`.
    Success,
    /// A task attempt failed. Polling continues.
    Error,
    /// The run exceeded its timeout. Always followed by `Close`.
    Timeout,
    /// The poller went from active to inactive.
    Close,
}

impl EventKind {
    /// All channels, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Start,
        EventKind::Second,
        EventKind::Success,
        EventKind::Error,
        EventKind::Timeout,
        EventKind::Close,
    ];

    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Second => "second",
            EventKind::Success => "success",
            EventKind::Error => "error",
            EventKind::Timeout => "timeout",
            EventKind::Close => "close",
        }
    }

    /// Terminal kinds end a run; at most one is published per `start()`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Success | EventKind::Timeout)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Lifecycle event with its channel payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<P> {
    /// See [`EventKind::Start`].
    Start(TrackingTime),
    /// See [`EventKind::Second`].
    Second(TrackingTime),
    /// See [`EventKind::Success`].
    Success(P),
    /// See [`EventKind::Error`].
    Error(TaskError),
    /// See [`EventKind::Timeout`].
    Timeout,
    /// See [`EventKind::Close`].
    Close,
}

impl<P> Event<P> {
    /// Channel this event is published on.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start(_) => EventKind::Start,
            Event::Second(_) => EventKind::Second,
            Event::Success(_) => EventKind::Success,
            Event::Error(_) => EventKind::Error,
            Event::Timeout => EventKind::Timeout,
            Event::Close => EventKind::Close,
        }
    }

    /// Tracking payload of `start` / `second` events.
    #[inline]
    pub fn tracking(&self) -> Option<TrackingTime> {
        match self {
            Event::Start(t) | Event::Second(t) => Some(*t),
            _ => None,
        }
    }

    /// Payload of a `success` event.
    #[inline]
    pub fn payload(&self) -> Option<&P> {
        match self {
            Event::Success(p) => Some(p),
            _ => None,
        }
    }

    /// Failure carried by an `error` event.
    #[inline]
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Event::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down() {
        let mut t = TrackingTime::initial(5);
        let mut seen = Vec::new();
        for _ in 0..4 {
            t = t.tick(5);
            seen.push((t.passed, t.remaining));
        }
        assert_eq!(seen, vec![(1, 4), (2, 3), (3, 2), (4, 1)]);
    }

    #[test]
    fn test_tick_saturates_at_zero() {
        let t = TrackingTime::new(3, 0).tick(3);
        assert_eq!(t, TrackingTime::new(4, 0));
    }

    #[test]
    fn test_event_kind_mapping() {
        let events: Vec<Event<()>> = vec![
            Event::Start(TrackingTime::initial(30)),
            Event::Second(TrackingTime::new(1, 29)),
            Event::Success(()),
            Event::Error(TaskError::fail("boom")),
            Event::Timeout,
            Event::Close,
        ];
        let kinds: Vec<EventKind> = events.iter().map(Event::kind).collect();
        assert_eq!(kinds, EventKind::ALL.to_vec());
    }

    #[test]
    fn test_only_success_and_timeout_are_terminal() {
        let terminal: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(EventKind::is_terminal)
            .collect();
        assert_eq!(terminal, vec![EventKind::Success, EventKind::Timeout]);
    }
}
