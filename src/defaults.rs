//! Default configuration constants for voicekey.
//!
//! Shared across configuration types so the classifier, accumulator and
//! transcriber always agree on the frame geometry.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default frame duration in milliseconds.
///
/// WebRTC-style classifiers accept 10, 20 or 30 ms frames; 20 ms is the
/// common middle ground (320 samples at 16kHz).
pub const FRAME_MS: u32 = 20;

/// Bytes per sample (16-bit PCM).
pub const SAMPLE_WIDTH: u32 = 2;

/// Default classifier aggressiveness (0 = permissive, 3 = strictest).
pub const VAD_AGGRESSIVENESS: u8 = 2;

/// Default number of buffered frames before a segment can complete.
///
/// Six 20 ms frames ≈ 120 ms of audio, enough to reject coughs and clicks.
pub const SPEAKING_THRESHOLD: usize = 6;

/// Default silence frames that end a candidate segment.
///
/// Five frames ≈ 100 ms: short, so keyword segments dispatch quickly after a
/// believable pause.
pub const SHORT_SILENCE_FRAMES: u32 = 5;

/// Default silence frames that clear a stale dispatch lock.
///
/// Fifteen frames ≈ 300 ms of unbroken silence proves the utterance truly
/// ended; only then is a hung dispatch forcibly unlocked.
pub const LONG_SILENCE_FRAMES: u32 = 15;

/// Default cooldown between fallback dictation triggers, in milliseconds.
pub const DEBOUNCE_MS: u64 = 1000;

/// Default key code for the dictation trigger (KEY_VOICECOMMAND, pressed
/// twice like the double-tap dictation shortcut it emulates).
pub const DICTATION_KEYCODE: u32 = 582;

/// Default Whisper model path.
pub const DEFAULT_MODEL: &str = "models/ggml-base.en.bin";

/// Default language code for transcription.
///
/// "auto" lets Whisper detect the spoken language automatically.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Number of samples in one frame at the given geometry.
pub const fn frame_samples(sample_rate: u32, frame_ms: u32) -> usize {
    (sample_rate as usize * frame_ms as usize) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_samples_at_default_geometry() {
        assert_eq!(frame_samples(SAMPLE_RATE, FRAME_MS), 320);
    }

    #[test]
    fn frame_samples_at_other_rates() {
        assert_eq!(frame_samples(8000, 20), 160);
        assert_eq!(frame_samples(16000, 10), 160);
        assert_eq!(frame_samples(16000, 30), 480);
    }

    #[test]
    fn silence_windows_are_ordered() {
        assert!(SHORT_SILENCE_FRAMES < LONG_SILENCE_FRAMES);
    }
}
