//! Injectable time source, allowing mock time in tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Trait for time operations.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl Clock for Arc<dyn Clock> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for testing that allows manual time advancement.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Creates a new mock clock starting at the current instant.
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advances the mock clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        #[allow(clippy::unwrap_used)]
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        #[allow(clippy::unwrap_used)]
        let current = self.current.lock().unwrap();
        *current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_clock_advances_manually() {
        let clock = MockClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now().duration_since(start), Duration::from_millis(500));

        // Time does not move on its own
        assert_eq!(clock.now().duration_since(start), Duration::from_millis(500));
    }

    #[test]
    fn arc_dyn_clock_delegates() {
        let mock = MockClock::new();
        let start = mock.now();
        let shared: Arc<dyn Clock> = Arc::new(mock.clone());

        mock.advance(Duration::from_secs(1));
        assert_eq!(shared.now().duration_since(start), Duration::from_secs(1));
    }
}
