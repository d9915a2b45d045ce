//! Single-flight guard shared between the capture path and the dispatch path.

use std::sync::Mutex;

/// State behind the lock: the busy flag and a generation counter.
///
/// The generation ties a release to the acquisition that produced it, so a
/// worker finishing late cannot release a lock that was force-released and
/// re-acquired in the meantime.
#[derive(Debug)]
struct FlightState {
    busy: bool,
    generation: u64,
}

/// Token returned by a successful acquisition.
///
/// Must be passed back to [`FlightLock::release`] when the dispatch
/// completes. Not cloneable: exactly one release per acquisition.
#[derive(Debug)]
pub struct FlightToken {
    generation: u64,
}

/// At-most-one-in-flight dispatch guard.
///
/// The accumulator reads `is_busy()` when evaluating its ready condition and
/// calls `force_release()` when long silence proves a dispatch went stale;
/// the scheduler acquires before handing a segment to its worker and the
/// worker releases on completion.
#[derive(Debug)]
pub struct FlightLock {
    state: Mutex<FlightState>,
}

impl FlightLock {
    /// Creates a new, unlocked flight lock.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FlightState {
                busy: false,
                generation: 0,
            }),
        }
    }

    /// Returns true if a dispatch is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Attempts to acquire the lock. Returns a token on success, `None` if a
    /// dispatch is already in flight.
    pub fn try_acquire(&self) -> Option<FlightToken> {
        let mut state = self.lock();
        if state.busy {
            return None;
        }
        state.busy = true;
        state.generation += 1;
        Some(FlightToken {
            generation: state.generation,
        })
    }

    /// Releases the lock held by `token`.
    ///
    /// Returns false if the token is stale (the lock was force-released and
    /// possibly re-acquired since), in which case nothing changes.
    pub fn release(&self, token: FlightToken) -> bool {
        let mut state = self.lock();
        if state.busy && state.generation == token.generation {
            state.busy = false;
            true
        } else {
            false
        }
    }

    /// Clears the busy flag regardless of who holds it.
    ///
    /// Used by the accumulator's long-silence abandon path to recover from a
    /// dispatch that never completed. Returns true if a lock was cleared.
    pub fn force_release(&self) -> bool {
        let mut state = self.lock();
        let was_busy = state.busy;
        state.busy = false;
        was_busy
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FlightState> {
        // Mutex poisoning only happens if a holder panicked; the flag state
        // is still coherent, so recover the guard.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FlightLock {
    fn default() -> Self {
        Self::new()
    }
}
