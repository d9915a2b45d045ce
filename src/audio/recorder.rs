use crate::defaults;
use crate::error::{Result, VoicekeyError};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device, WAV file,
/// or mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever audio samples are currently available.
    ///
    /// An empty read means "nothing yet" for live sources and "exhausted"
    /// for finite ones.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// True for sources that end on their own (files, pipes).
    fn is_finite(&self) -> bool {
        false
    }
}

/// Configuration for audio source initialization
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub sample_rate: u32,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// One phase of a scripted frame sequence: `count` reads each returning
/// `samples`.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock audio source for testing.
///
/// Either returns a fixed sample buffer on every read, or plays through a
/// scripted sequence of [`FramePhase`]s and then reports exhaustion.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<i16>,
    phases: Option<Vec<FramePhase>>,
    phase_index: usize,
    phase_reads: u32,
    finite: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0i16; defaults::frame_samples(defaults::SAMPLE_RATE, defaults::FRAME_MS)],
            phases: None,
            phase_index: 0,
            phase_reads: 0,
            finite: true,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return specific samples on every read.
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to play a scripted sequence of phases, then report
    /// exhaustion (empty reads).
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = Some(phases);
        self
    }

    /// Report as a live source: empty reads mean "not yet", not exhaustion.
    pub fn as_live_source(mut self) -> Self {
        self.finite = false;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(VoicekeyError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn is_finite(&self) -> bool {
        self.finite
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VoicekeyError::AudioCapture {
                message: self.error_message.clone(),
            });
        }

        let Some(phases) = &self.phases else {
            return Ok(self.samples.clone());
        };

        while self.phase_index < phases.len() {
            let phase = &phases[self.phase_index];
            if self.phase_reads < phase.count {
                self.phase_reads += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.phase_reads = 0;
        }

        // Sequence exhausted
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_audio_source_returns_configured_samples() {
        let test_samples = vec![100i16, 200, 300, 400, 500];
        let mut source = MockAudioSource::new().with_samples(test_samples.clone());

        assert_eq!(source.read_samples().unwrap(), test_samples);
        // Fixed-buffer mocks repeat forever
        assert_eq!(source.read_samples().unwrap(), test_samples);
    }

    #[test]
    fn test_mock_audio_source_default_frame_size() {
        let mut source = MockAudioSource::new();
        let samples = source.read_samples().unwrap();
        assert_eq!(samples.len(), 320);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_mock_audio_source_read_error() {
        let mut source = MockAudioSource::new()
            .with_read_failure()
            .with_error_message("buffer overflow");

        match source.read_samples() {
            Err(VoicekeyError::AudioCapture { message }) => {
                assert_eq!(message, "buffer overflow");
            }
            _ => panic!("Expected AudioCapture error"),
        }
    }

    #[test]
    fn test_mock_audio_source_start_stop_state() {
        let mut source = MockAudioSource::new();

        assert!(!source.is_started());
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_audio_source_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();
        assert!(source.start().is_err());
        assert!(!source.is_started());
    }

    #[test]
    fn test_frame_sequence_plays_phases_in_order() {
        let loud = FramePhase {
            samples: vec![1000i16; 4],
            count: 2,
        };
        let quiet = FramePhase {
            samples: vec![0i16; 4],
            count: 1,
        };
        let mut source = MockAudioSource::new().with_frame_sequence(vec![loud, quiet]);

        assert_eq!(source.read_samples().unwrap(), vec![1000i16; 4]);
        assert_eq!(source.read_samples().unwrap(), vec![1000i16; 4]);
        assert_eq!(source.read_samples().unwrap(), vec![0i16; 4]);
        // Exhausted: empty reads from now on
        assert!(source.read_samples().unwrap().is_empty());
        assert!(source.read_samples().unwrap().is_empty());
    }

    #[test]
    fn test_mock_is_finite_by_default_live_when_asked() {
        let source = MockAudioSource::new();
        assert!(source.is_finite());

        let live = MockAudioSource::new().as_live_source();
        assert!(!live.is_finite());
    }

    #[test]
    fn test_audio_source_trait_is_object_safe() {
        let mut source: Box<dyn AudioSource> =
            Box::new(MockAudioSource::new().with_samples(vec![1i16, 2, 3]));

        source.start().unwrap();
        assert_eq!(source.read_samples().unwrap(), vec![1i16, 2, 3]);
        source.stop().unwrap();
    }

    #[test]
    fn test_audio_source_config_default() {
        let config = AudioSourceConfig::default();
        assert_eq!(config.sample_rate, 16000);
    }
}
