//! Audio acquisition and per-frame classification.

pub mod classifier;
pub mod framer;
pub mod recorder;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub mod capture;

#[cfg(feature = "vad-earshot")]
pub use classifier::EarshotClassifier;
pub use classifier::{FrameClassifier, MockClassifier, ThresholdClassifier};
pub use framer::Framer;
pub use recorder::{AudioSource, FramePhase, MockAudioSource};
pub use wav::WavAudioSource;
