//! Cooldown gate for the fallback dictation trigger.

use crate::clock::{Clock, SystemClock};
use std::time::{Duration, Instant};

/// Tracks the last fallback trigger and enforces a minimum interval between
/// firings. Non-fallback commands are never routed through this gate.
#[derive(Debug)]
pub struct DebounceClock<C: Clock = SystemClock> {
    interval: Duration,
    last_trigger: Option<Instant>,
    clock: C,
}

impl DebounceClock<SystemClock> {
    /// Creates a debounce gate with the given cooldown using the system clock.
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, SystemClock)
    }
}

impl<C: Clock> DebounceClock<C> {
    /// Creates a debounce gate with the given cooldown and clock.
    pub fn with_clock(interval: Duration, clock: C) -> Self {
        Self {
            interval,
            last_trigger: None,
            clock,
        }
    }

    /// Attempts to fire the gated action.
    ///
    /// Returns true (and records the trigger time) if at least `interval` has
    /// passed since the last successful trigger. On suppression the recorded
    /// time is left untouched, so rapid repeats do not extend the cooldown.
    pub fn try_trigger(&mut self) -> bool {
        let now = self.clock.now();
        let allowed = match self.last_trigger {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };
        if allowed {
            self.last_trigger = Some(now);
        }
        allowed
    }

    /// The configured cooldown interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn gate(clock: &MockClock) -> DebounceClock<MockClock> {
        DebounceClock::with_clock(Duration::from_secs(1), clock.clone())
    }

    #[test]
    fn first_trigger_always_fires() {
        let clock = MockClock::new();
        let mut debounce = gate(&clock);
        assert!(debounce.try_trigger());
    }

    #[test]
    fn trigger_within_interval_is_suppressed() {
        let clock = MockClock::new();
        let mut debounce = gate(&clock);

        assert!(debounce.try_trigger());
        clock.advance(Duration::from_millis(300));
        assert!(!debounce.try_trigger());
    }

    #[test]
    fn trigger_after_interval_fires() {
        let clock = MockClock::new();
        let mut debounce = gate(&clock);

        assert!(debounce.try_trigger());
        clock.advance(Duration::from_millis(1200));
        assert!(debounce.try_trigger());
    }

    #[test]
    fn suppressed_trigger_does_not_extend_cooldown() {
        let clock = MockClock::new();
        let mut debounce = gate(&clock);

        assert!(debounce.try_trigger());

        // A suppressed attempt at 800 ms must not reset the window:
        // the next attempt at 1000 ms total still fires.
        clock.advance(Duration::from_millis(800));
        assert!(!debounce.try_trigger());
        clock.advance(Duration::from_millis(200));
        assert!(debounce.try_trigger());
    }

    #[test]
    fn exact_interval_boundary_fires() {
        let clock = MockClock::new();
        let mut debounce = gate(&clock);

        assert!(debounce.try_trigger());
        clock.advance(Duration::from_secs(1));
        assert!(debounce.try_trigger());
    }
}
