use crate::command::{ActionId, CommandTable};
use crate::defaults;
use crate::error::{Result, VoicekeyError};
use crate::monitor::AccumulatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub vad: VadConfig,
    pub dispatch: DispatchConfig,
    pub stt: SttConfig,
    pub commands: Vec<CommandBinding>,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_ms: u32,
}

/// Segment detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadConfig {
    /// Classifier aggressiveness, 0 (permissive) to 3 (strict).
    pub aggressiveness: u8,
    /// Buffered frames required before a segment can complete.
    pub speaking_threshold: usize,
    /// Consecutive silence frames that end a segment.
    pub short_silence_frames: u32,
    /// Consecutive silence frames that clear a stale dispatch lock.
    pub long_silence_frames: u32,
}

/// Dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Cooldown between fallback dictation triggers, in milliseconds.
    pub debounce_ms: u64,
    /// Key code double-tapped for the dictation trigger.
    pub dictation_keycode: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    /// Path to the Whisper model file.
    pub model: String,
    pub language: String,
}

/// One configured keyword binding. Order in the configuration file defines
/// match priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandBinding {
    pub phrase: String,
    pub action: ActionId,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_ms: defaults::FRAME_MS,
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            aggressiveness: defaults::VAD_AGGRESSIVENESS,
            speaking_threshold: defaults::SPEAKING_THRESHOLD,
            short_silence_frames: defaults::SHORT_SILENCE_FRAMES,
            long_silence_frames: defaults::LONG_SILENCE_FRAMES,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::DEBOUNCE_MS,
            dictation_keycode: defaults::DICTATION_KEYCODE,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; invalid TOML or out-of-range
    /// values are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoicekeyError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoicekeyError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it does not
    /// exist. Invalid TOML still errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoicekeyError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.vad.aggressiveness > 3 {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "vad.aggressiveness".to_string(),
                message: "must be 0-3".to_string(),
            });
        }
        if self.vad.speaking_threshold == 0 {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "vad.speaking_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.vad.short_silence_frames == 0 {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "vad.short_silence_frames".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.vad.short_silence_frames >= self.vad.long_silence_frames {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "vad.long_silence_frames".to_string(),
                message: "must be greater than short_silence_frames".to_string(),
            });
        }
        if !matches!(self.audio.frame_ms, 10 | 20 | 30) {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "audio.frame_ms".to_string(),
                message: "must be 10, 20 or 30".to_string(),
            });
        }
        if !matches!(self.audio.sample_rate, 8000 | 16000 | 32000 | 48000) {
            return Err(VoicekeyError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be 8000, 16000, 32000 or 48000".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOICEKEY_MODEL → stt.model
    /// - VOICEKEY_LANGUAGE → stt.language
    /// - VOICEKEY_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VOICEKEY_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("VOICEKEY_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(device) = std::env::var("VOICEKEY_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voicekey/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voicekey").join("config.toml"))
    }

    /// The keyword table: configured bindings in file order, or the built-in
    /// defaults when none are configured.
    pub fn command_table(&self) -> CommandTable {
        if self.commands.is_empty() {
            CommandTable::default_table()
        } else {
            CommandTable::new(
                self.commands
                    .iter()
                    .map(|b| (b.phrase.clone(), b.action)),
            )
        }
    }

    /// Segment state machine thresholds.
    pub fn accumulator_config(&self) -> AccumulatorConfig {
        AccumulatorConfig {
            speaking_threshold: self.vad.speaking_threshold,
            short_silence_frames: self.vad.short_silence_frames,
            long_silence_frames: self.vad.long_silence_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.frame_ms, 20);
        assert_eq!(config.vad.aggressiveness, 2);
        assert_eq!(config.vad.speaking_threshold, 6);
        assert_eq!(config.vad.short_silence_frames, 5);
        assert_eq!(config.vad.long_silence_frames, 15);
        assert_eq!(config.dispatch.debounce_ms, 1000);
        assert!(config.commands.is_empty());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: Config = toml::from_str(
            r#"
            [vad]
            aggressiveness = 3
            speaking_threshold = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.vad.aggressiveness, 3);
        assert_eq!(config.vad.speaking_threshold, 10);
        assert_eq!(config.vad.short_silence_frames, 5);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn commands_preserve_file_order() {
        let config: Config = toml::from_str(
            r#"
            [[commands]]
            phrase = "dispatch"
            action = "send"

            [[commands]]
            phrase = "wipe"
            action = "clear"
            "#,
        )
        .unwrap();

        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[0].phrase, "dispatch");
        assert_eq!(config.commands[0].action, ActionId::Send);
        assert_eq!(config.commands[1].action, ActionId::Clear);

        let table = config.command_table();
        assert_eq!(table.entries()[0].phrase(), "dispatch");
        assert_eq!(table.entries()[1].phrase(), "wipe");
    }

    #[test]
    fn unknown_action_name_is_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [[commands]]
            phrase = "boom"
            action = "self_destruct"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_commands_fall_back_to_default_table() {
        let config = Config::default();
        let table = config.command_table();
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn validate_rejects_out_of_range_aggressiveness() {
        let mut config = Config::default();
        config.vad.aggressiveness = 4;
        assert!(matches!(
            config.validate(),
            Err(VoicekeyError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_speaking_threshold() {
        let mut config = Config::default();
        config.vad.speaking_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_silence_windows() {
        let mut config = Config::default();
        config.vad.short_silence_frames = 20;
        config.vad.long_silence_frames = 15;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_odd_frame_duration() {
        let mut config = Config::default();
        config.audio.frame_ms = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_or_default_returns_defaults_for_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/voicekey.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_parses_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [audio]
            sample_rate = 16000
            frame_ms = 30

            [dispatch]
            debounce_ms = 2500
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.frame_ms, 30);
        assert_eq!(config.dispatch.debounce_ms, 2500);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not = [valid toml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [vad]
            aggressiveness = 9
            "#
        )
        .unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(VoicekeyError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_when_set() {
        // SAFETY: test-only env mutation; no other test reads these vars
        unsafe {
            std::env::set_var("VOICEKEY_MODEL", "/tmp/model.bin");
            std::env::set_var("VOICEKEY_AUDIO_DEVICE", "pipewire");
        }

        let config = Config::default().with_env_overrides();
        assert_eq!(config.stt.model, "/tmp/model.bin");
        assert_eq!(config.audio.device.as_deref(), Some("pipewire"));

        unsafe {
            std::env::remove_var("VOICEKEY_MODEL");
            std::env::remove_var("VOICEKEY_AUDIO_DEVICE");
        }
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.commands.push(CommandBinding {
            phrase: "send".to_string(),
            action: ActionId::Send,
        });

        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
