//! Per-frame speech/non-speech classification.
//!
//! Classification is an injected capability: the monitor only needs a
//! boolean label per frame. The production implementation wraps the
//! `earshot` WebRTC-style detector; tests use scripted mocks.

use crate::error::Result;
#[cfg(feature = "vad-earshot")]
use crate::error::VoicekeyError;

/// Trait for labeling one fixed-duration frame as speech or non-speech.
///
/// A classification error must not break the pipeline: the capture loop
/// treats a failed frame as silence and keeps going.
pub trait FrameClassifier: Send {
    /// Classify one frame of 16-bit PCM mono samples.
    fn classify(&mut self, samples: &[i16], sample_rate: u32) -> Result<bool>;

    /// Reset any internal detector state.
    fn reset(&mut self) {}

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "classifier"
    }
}

/// Earshot-backed classifier (WebRTC VAD port).
///
/// Aggressiveness 0-3 maps onto earshot's four profiles, 0 being the most
/// permissive and 3 the strictest about what counts as speech.
#[cfg(feature = "vad-earshot")]
pub struct EarshotClassifier {
    detector: earshot::VoiceActivityDetector,
    frame_samples: usize,
}

#[cfg(feature = "vad-earshot")]
impl EarshotClassifier {
    /// Creates a classifier with the given aggressiveness (clamped to 0-3)
    /// and frame size in samples.
    pub fn new(aggressiveness: u8, frame_samples: usize) -> Self {
        use earshot::VoiceActivityProfile;

        let profile = match aggressiveness {
            0 => VoiceActivityProfile::QUALITY,
            1 => VoiceActivityProfile::LBR,
            2 => VoiceActivityProfile::AGGRESSIVE,
            _ => VoiceActivityProfile::VERY_AGGRESSIVE,
        };
        Self {
            detector: earshot::VoiceActivityDetector::new(profile),
            frame_samples,
        }
    }
}

#[cfg(feature = "vad-earshot")]
impl FrameClassifier for EarshotClassifier {
    fn classify(&mut self, samples: &[i16], _sample_rate: u32) -> Result<bool> {
        if samples.len() != self.frame_samples {
            return Err(VoicekeyError::Classification {
                message: format!(
                    "expected {} samples per frame, got {}",
                    self.frame_samples,
                    samples.len()
                ),
            });
        }
        self.detector
            .predict_16khz(samples)
            .map_err(|_| VoicekeyError::Classification {
                message: "earshot prediction failed".to_string(),
            })
    }

    fn reset(&mut self) {
        self.detector.reset();
    }

    fn name(&self) -> &'static str {
        "earshot"
    }
}

/// Scripted classifier for testing.
///
/// Returns the scripted decisions in order, then `default_decision`.
/// Individual frames can be scripted to fail.
#[derive(Debug, Default)]
pub struct MockClassifier {
    decisions: std::collections::VecDeque<Result<bool>>,
    default_decision: bool,
    resets: u32,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a run of decisions, consumed one per frame.
    pub fn with_decisions<I: IntoIterator<Item = bool>>(mut self, decisions: I) -> Self {
        self.decisions.extend(decisions.into_iter().map(Ok));
        self
    }

    /// Script a classification failure for the next frame in sequence.
    pub fn with_failure(mut self) -> Self {
        self.decisions
            .push_back(Err(crate::error::VoicekeyError::Classification {
                message: "mock classification failure".to_string(),
            }));
        self
    }

    /// Decision returned once the script is exhausted (default: silence).
    pub fn with_default(mut self, decision: bool) -> Self {
        self.default_decision = decision;
        self
    }

    /// How many times reset() was called.
    pub fn resets(&self) -> u32 {
        self.resets
    }
}

impl FrameClassifier for MockClassifier {
    fn classify(&mut self, _samples: &[i16], _sample_rate: u32) -> Result<bool> {
        self.decisions
            .pop_front()
            .unwrap_or(Ok(self.default_decision))
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Amplitude-threshold classifier for tests driven by sample content.
///
/// Labels a frame as speech when its peak amplitude exceeds the threshold.
/// Deterministic and stateless, which makes scripted audio sources easy to
/// pair with it.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    threshold: i16,
}

impl ThresholdClassifier {
    pub fn new(threshold: i16) -> Self {
        Self { threshold }
    }
}

impl FrameClassifier for ThresholdClassifier {
    fn classify(&mut self, samples: &[i16], _sample_rate: u32) -> Result<bool> {
        Ok(samples
            .iter()
            .any(|&s| s.unsigned_abs() > self.threshold.unsigned_abs()))
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}
