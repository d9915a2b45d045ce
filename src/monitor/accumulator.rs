//! Segment accumulator: the per-frame state machine that turns a classified
//! frame stream into dispatchable utterance segments.
//!
//! Two silence windows drive the machine: a short one ends a keyword segment
//! quickly after a believable pause, a long one proves the utterance truly
//! ended and clears a dispatch lock that was never released.

use crate::defaults;
use crate::monitor::flight::FlightLock;
use crate::monitor::types::{Frame, Segment, SegmentEvent};
use std::sync::Arc;

/// Configuration for the segment accumulator.
#[derive(Debug, Clone, Copy)]
pub struct AccumulatorConfig {
    /// Buffered frames required before a segment can complete.
    pub speaking_threshold: usize,
    /// Consecutive silence frames that end a candidate segment.
    pub short_silence_frames: u32,
    /// Consecutive silence frames that clear a stale dispatch lock.
    pub long_silence_frames: u32,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            speaking_threshold: defaults::SPEAKING_THRESHOLD,
            short_silence_frames: defaults::SHORT_SILENCE_FRAMES,
            long_silence_frames: defaults::LONG_SILENCE_FRAMES,
        }
    }
}

/// Accumulator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No candidate segment open; speech opens one.
    Idle,
    /// Frames are being collected into the current candidate segment.
    Accumulating,
}

/// Per-stream segment state machine.
///
/// Exactly one instance per monitoring session, mutated only by the capture
/// loop. Holds the shared [`FlightLock`] so the ready condition can observe
/// whether a dispatch is in flight.
pub struct SegmentAccumulator {
    config: AccumulatorConfig,
    flight: Arc<FlightLock>,
    phase: Phase,
    speaking_frames: u32,
    silence_frames: u32,
    buffer: Vec<Frame>,
}

impl SegmentAccumulator {
    /// Creates an accumulator sharing `flight` with the dispatch scheduler.
    pub fn new(config: AccumulatorConfig, flight: Arc<FlightLock>) -> Self {
        Self {
            config,
            flight,
            phase: Phase::Idle,
            speaking_frames: 0,
            silence_frames: 0,
            buffer: Vec::new(),
        }
    }

    /// Feeds one classified frame and returns what, if anything, completed.
    ///
    /// Frames must arrive in capture order. A classification failure upstream
    /// is mapped to `is_speech = false` before this call; ingest itself never
    /// fails.
    pub fn ingest(&mut self, frame: Frame, is_speech: bool) -> SegmentEvent {
        match self.phase {
            Phase::Idle => {
                if is_speech {
                    self.phase = Phase::Accumulating;
                    self.speaking_frames = 1;
                    self.silence_frames = 0;
                    self.buffer.clear();
                    self.buffer.push(frame);
                }
                // Silence while idle is discarded
                SegmentEvent::None
            }
            Phase::Accumulating => {
                self.buffer.push(frame);

                if is_speech {
                    self.speaking_frames += 1;
                    self.silence_frames = 0;
                } else {
                    self.silence_frames += 1;
                    if self.speaking_frames > 0 {
                        // A silence run interrupts the speaking run but keeps
                        // the buffer: the utterance may not be over yet.
                        self.speaking_frames = 0;
                    }
                }

                if self.buffer.len() >= self.config.speaking_threshold
                    && self.silence_frames >= self.config.short_silence_frames
                    && !self.flight.is_busy()
                {
                    let segment = Segment::new(std::mem::take(&mut self.buffer));
                    self.reset();
                    return SegmentEvent::SegmentReady(segment);
                }

                if self.silence_frames >= self.config.long_silence_frames
                    && self.flight.is_busy()
                {
                    // The dispatch that blocked this segment never finished.
                    // Unlock it and drop the stale buffer; the utterance is
                    // long over and must not be re-dispatched.
                    self.flight.force_release();
                    self.reset();
                }

                SegmentEvent::None
            }
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consecutive speech frames in the active speaking run.
    pub fn speaking_frames(&self) -> u32 {
        self.speaking_frames
    }

    /// Consecutive silence frames since the last speech frame.
    pub fn silence_frames(&self) -> u32 {
        self.silence_frames
    }

    /// Frames buffered in the open candidate segment.
    pub fn buffered_frames(&self) -> usize {
        self.buffer.len()
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.speaking_frames = 0;
        self.silence_frames = 0;
        self.buffer.clear();
    }
}
