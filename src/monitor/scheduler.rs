//! Single-slot dispatch scheduler.
//!
//! A ready segment is handed to one long-lived worker thread over a
//! bounded(1) channel; the shared [`FlightLock`] guarantees at most one
//! dispatch in flight, and a segment arriving while busy is dropped (no
//! queueing). The worker runs transcribe → resolve → execute and releases
//! the lock on every completion path.

use crate::clock::{Clock, SystemClock};
use crate::command::{ActionId, CommandResolver, Resolution};
use crate::defaults;
use crate::inject::keystroke::ActionExecutor;
use crate::monitor::debounce::DebounceClock;
use crate::monitor::flight::{FlightLock, FlightToken};
use crate::monitor::report::{ErrorReporter, LogReporter, StageError};
use crate::monitor::types::Segment;
use crate::stt::Transcriber;
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Shared pause/resume toggle for the fallback dictation action.
///
/// While paused, keyword commands still execute but the fallback is
/// suppressed. Cheap to clone; all clones observe the same state.
#[derive(Debug, Clone)]
pub struct ListeningGate {
    listening: Arc<AtomicBool>,
}

impl ListeningGate {
    /// Creates an open (listening) gate.
    pub fn new() -> Self {
        Self {
            listening: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Suppress fallback dictation.
    pub fn pause(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    /// Re-enable fallback dictation.
    pub fn resume(&self) {
        self.listening.store(true, Ordering::SeqCst);
    }

    /// True if fallback dictation may fire.
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

impl Default for ListeningGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Session counters, shared between the scheduler and the session handle.
#[derive(Debug, Default)]
pub struct SessionStats {
    dispatched: AtomicU64,
    dropped: AtomicU64,
    actions: AtomicU64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments handed to the dispatch worker.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Segments dropped because a dispatch was already in flight.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Actions successfully executed.
    pub fn actions(&self) -> u64 {
        self.actions.load(Ordering::SeqCst)
    }

    fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }

    fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }

    fn record_action(&self) {
        self.actions.fetch_add(1, Ordering::SeqCst);
    }
}

/// The transcribe → resolve → execute chain run for each dispatched segment.
///
/// Configure with the builder methods, then hand to
/// [`DispatchScheduler::spawn`].
pub struct DispatchWorker {
    transcriber: Arc<dyn Transcriber>,
    resolver: CommandResolver,
    executor: Box<dyn ActionExecutor>,
    debounce: DebounceClock<Arc<dyn Clock>>,
    gate: ListeningGate,
    stats: Arc<SessionStats>,
    reporter: Arc<dyn ErrorReporter>,
}

impl DispatchWorker {
    /// Creates a worker with the system clock, default debounce interval, an
    /// open listening gate and a stderr reporter.
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        resolver: CommandResolver,
        executor: Box<dyn ActionExecutor>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            transcriber,
            resolver,
            executor,
            debounce: DebounceClock::with_clock(
                Duration::from_millis(defaults::DEBOUNCE_MS),
                clock,
            ),
            gate: ListeningGate::new(),
            stats: Arc::new(SessionStats::new()),
            reporter: Arc::new(LogReporter),
        }
    }

    /// Replaces the fallback debounce gate.
    pub fn with_debounce(mut self, debounce: DebounceClock<Arc<dyn Clock>>) -> Self {
        self.debounce = debounce;
        self
    }

    /// Shares an external listening gate.
    pub fn with_gate(mut self, gate: ListeningGate) -> Self {
        self.gate = gate;
        self
    }

    /// Shares external session counters.
    pub fn with_stats(mut self, stats: Arc<SessionStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Sets a custom error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn process(&mut self, segment: Segment) {
        let samples = segment.samples();
        let text = match self.transcriber.transcribe(&samples) {
            Ok(text) => text,
            Err(e) => {
                // Failed segment produces no action, not an error dialog
                self.reporter
                    .report("transcribe", &StageError::Recoverable(e.to_string()));
                return;
            }
        };

        match self.resolver.resolve(&text) {
            Resolution::Command(action) => {
                match action {
                    ActionId::PauseListening => self.gate.pause(),
                    ActionId::ResumeListening => self.gate.resume(),
                    _ => {}
                }
                self.execute(action);
            }
            Resolution::Fallback => {
                if !self.gate.is_listening() {
                    return;
                }
                if self.debounce.try_trigger() {
                    self.execute(ActionId::Dictate);
                }
            }
        }
    }

    fn execute(&mut self, action: ActionId) {
        match self.executor.execute(action) {
            Ok(()) => self.stats.record_action(),
            Err(e) => self
                .reporter
                .report("execute", &StageError::Recoverable(e.to_string())),
        }
    }
}

struct DispatchJob {
    segment: Segment,
    token: FlightToken,
}

/// Bounded single-slot scheduler owning the dispatch worker thread.
///
/// Dropping the scheduler closes the channel and joins the worker, so no
/// dispatch outlives the session unmanaged.
pub struct DispatchScheduler {
    flight: Arc<FlightLock>,
    stats: Arc<SessionStats>,
    reporter: Arc<dyn ErrorReporter>,
    tx: Option<Sender<DispatchJob>>,
    worker: Option<JoinHandle<()>>,
}

impl DispatchScheduler {
    /// Spawns the worker thread and returns the scheduler.
    ///
    /// `flight` must be the same lock the accumulator consults; that is what
    /// makes the ready condition and the dispatch hand-off agree.
    pub fn spawn(worker: DispatchWorker, flight: Arc<FlightLock>) -> Self {
        let stats = worker.stats.clone();
        let reporter = worker.reporter.clone();
        let (tx, rx) = bounded::<DispatchJob>(1);

        let worker_flight = flight.clone();
        let handle = std::thread::spawn(move || {
            let mut worker = worker;
            while let Ok(job) = rx.recv() {
                worker.process(job.segment);
                // A stale token (force-released by the accumulator during a
                // long silence) is ignored here; nothing else to do.
                worker_flight.release(job.token);
            }
        });

        Self {
            flight,
            stats,
            reporter,
            tx: Some(tx),
            worker: Some(handle),
        }
    }

    /// Accepts a ready segment, or drops it if a dispatch is in flight.
    pub fn on_segment_ready(&self, segment: Segment) {
        let Some(token) = self.flight.try_acquire() else {
            self.stats.record_dropped();
            self.reporter.report(
                "dispatch",
                &StageError::Recoverable(
                    "segment dropped: dispatch already in flight".to_string(),
                ),
            );
            return;
        };

        let Some(tx) = &self.tx else {
            self.flight.release(token);
            return;
        };

        // The lock keeps at most one job in the single-slot channel, so
        // this send does not block the capture loop.
        match tx.send(DispatchJob { segment, token }) {
            Ok(()) => self.stats.record_dispatched(),
            Err(err) => {
                let job = err.into_inner();
                self.flight.release(job.token);
                self.reporter.report(
                    "dispatch",
                    &StageError::Fatal("dispatch worker unavailable".to_string()),
                );
            }
        }
    }

    /// Shared session counters.
    pub fn stats(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }
}

impl Drop for DispatchScheduler {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after the in-flight job
        self.tx.take();
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            self.reporter.report(
                "dispatch",
                &StageError::Fatal("dispatch worker panicked".to_string()),
            );
        }
    }
}
