//! Monitoring session: wires source, classifier, accumulator and scheduler
//! together and owns the capture loop thread.
//!
//! The capture loop reads samples, frames them, classifies each frame and
//! feeds the accumulator, handing ready segments to the dispatch scheduler.
//! Dispatch runs on its own thread, so a slow transcription can never stall
//! frame ingestion.

use crate::audio::classifier::FrameClassifier;
use crate::audio::framer::Framer;
use crate::audio::recorder::AudioSource;
use crate::clock::{Clock, SystemClock};
use crate::command::CommandResolver;
use crate::defaults;
use crate::error::Result;
use crate::inject::keystroke::ActionExecutor;
use crate::monitor::accumulator::{AccumulatorConfig, SegmentAccumulator};
use crate::monitor::debounce::DebounceClock;
use crate::monitor::flight::FlightLock;
use crate::monitor::report::{ErrorReporter, LogReporter, StageError};
use crate::monitor::scheduler::{DispatchScheduler, DispatchWorker, ListeningGate, SessionStats};
use crate::monitor::types::SegmentEvent;
use crate::stt::Transcriber;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for a monitoring session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Segment state machine thresholds.
    pub accumulator: AccumulatorConfig,
    /// Sample rate shared by source, classifier and transcriber.
    pub sample_rate: u32,
    /// Frame duration in milliseconds.
    pub frame_ms: u32,
    /// Cooldown between fallback dictation triggers.
    pub debounce_ms: u64,
    /// Suppress status messages.
    pub quiet: bool,
    /// Verbosity level (0=quiet results, 1=segment diagnostics).
    pub verbosity: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            accumulator: AccumulatorConfig::default(),
            sample_rate: defaults::SAMPLE_RATE,
            frame_ms: defaults::FRAME_MS,
            debounce_ms: defaults::DEBOUNCE_MS,
            quiet: false,
            verbosity: 0,
        }
    }
}

/// Handle to a running monitoring session.
pub struct SessionHandle {
    running: Arc<AtomicBool>,
    capture: Option<JoinHandle<()>>,
    stats: Arc<SessionStats>,
}

impl SessionHandle {
    /// Returns true if the session has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared session counters.
    pub fn stats(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }

    /// Stops the session and joins the capture thread.
    ///
    /// Waits up to 5s (the capture thread itself joins the dispatch worker,
    /// which may be mid-transcription); after the deadline the thread is
    /// detached and dies with the process.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.join_with_deadline(Duration::from_secs(5));
    }

    /// Waits for the session to end on its own (finite sources).
    pub fn wait(mut self) {
        if let Some(handle) = self.capture.take()
            && handle.join().is_err()
        {
            eprintln!("voicekey: capture thread panicked");
        }
    }

    fn join_with_deadline(&mut self, deadline: Duration) {
        let Some(handle) = self.capture.take() else {
            return;
        };

        let end = Instant::now() + deadline;
        let poll_interval = Duration::from_millis(50);
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!("voicekey: capture thread panicked");
                }
                return;
            }
            if Instant::now() >= end {
                eprintln!("voicekey: shutdown timeout — capture thread still running, detaching");
                // Dropping the JoinHandle detaches the thread
                return;
            }
            thread::sleep(poll_interval);
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.join_with_deadline(Duration::from_secs(5));
    }
}

/// Voice monitoring session builder.
pub struct MonitorSession {
    config: SessionConfig,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl MonitorSession {
    /// Creates a session with the default error reporter and system clock.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            reporter: Arc::new(LogReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets a custom clock (for deterministic debounce testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the session.
    ///
    /// # Arguments
    /// * `source` - Audio capture source
    /// * `classifier` - Per-frame speech classifier
    /// * `transcriber` - Transcriber for completed segments
    /// * `resolver` - Keyword resolver
    /// * `executor` - Side-effect executor for resolved actions
    ///
    /// # Returns
    /// Handle to control and stop the session
    pub fn start(
        self,
        mut source: Box<dyn AudioSource>,
        mut classifier: Box<dyn FrameClassifier>,
        transcriber: Arc<dyn Transcriber>,
        resolver: CommandResolver,
        executor: Box<dyn ActionExecutor>,
    ) -> Result<SessionHandle> {
        let config = self.config;
        let flight = Arc::new(FlightLock::new());
        let stats = Arc::new(SessionStats::new());
        let gate = ListeningGate::new();

        let debounce = DebounceClock::with_clock(
            Duration::from_millis(config.debounce_ms),
            self.clock.clone(),
        );
        let worker = DispatchWorker::new(transcriber, resolver, executor)
            .with_debounce(debounce)
            .with_gate(gate)
            .with_stats(stats.clone())
            .with_reporter(self.reporter.clone());
        let scheduler = DispatchScheduler::spawn(worker, flight.clone());

        let mut accumulator = SegmentAccumulator::new(config.accumulator, flight);
        let mut framer = Framer::new(defaults::frame_samples(config.sample_rate, config.frame_ms));

        // Start audio capture before spawning the loop so setup errors
        // surface to the caller
        source.start()?;
        let source_is_finite = source.is_finite();

        let running = Arc::new(AtomicBool::new(true));
        let capture_running = running.clone();
        let reporter = self.reporter;

        let capture = thread::spawn(move || {
            // Poll the audio source at ~60Hz; reads drain whatever the
            // hardware buffered, the framer re-cuts exact frames.
            let poll_interval = Duration::from_millis(16);

            let mut consecutive_errors: u32 = 0;
            const MAX_CONSECUTIVE_ERRORS: u32 = 10;

            while capture_running.load(Ordering::SeqCst) {
                let samples = match source.read_samples() {
                    Ok(s) => {
                        consecutive_errors = 0;
                        s
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            reporter.report(
                                "capture",
                                &StageError::Fatal(format!(
                                    "audio capture failed {consecutive_errors} times in a row: {e}"
                                )),
                            );
                            break;
                        }
                        thread::sleep(poll_interval);
                        continue;
                    }
                };

                if samples.is_empty() {
                    if source_is_finite {
                        // File source exhausted — end the session.
                        break;
                    }
                    // Live source: empty read is normal while the audio
                    // device initializes. Keep polling.
                    thread::sleep(poll_interval);
                    continue;
                }

                for frame in framer.push(&samples) {
                    let is_speech = match classifier.classify(&frame.samples, config.sample_rate)
                    {
                        Ok(label) => label,
                        Err(e) => {
                            // A failed frame counts as silence, never fatal
                            reporter
                                .report("classify", &StageError::Recoverable(e.to_string()));
                            false
                        }
                    };

                    if let SegmentEvent::SegmentReady(segment) =
                        accumulator.ingest(frame, is_speech)
                    {
                        if !config.quiet && config.verbosity >= 1 {
                            eprintln!(
                                "voicekey: segment ready ({} frames, {} ms)",
                                segment.frame_count(),
                                segment.duration_ms(config.frame_ms)
                            );
                        }
                        scheduler.on_segment_ready(segment);
                    }
                }

                thread::sleep(poll_interval);
            }

            if framer.frames_produced() == 0 && !source_is_finite && !config.quiet {
                eprintln!("voicekey: no audio frames captured from microphone");
                eprintln!("  - Check that your microphone is connected and selected");
                eprintln!("  - Run: voicekey devices");
            }

            if let Err(e) = source.stop() {
                eprintln!("voicekey: failed to stop audio capture: {e}");
            }

            // Dropping the scheduler joins the dispatch worker
            drop(scheduler);
        });

        Ok(SessionHandle {
            running,
            capture: Some(capture),
            stats,
        })
    }
}
