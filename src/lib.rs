//! voicekey - Voice keyword commands for Linux desktops
//!
//! Continuously classifies a live audio stream into speech/silence segments,
//! transcribes completed segments, and maps the text onto keystroke commands
//! (or a fallback dictation trigger).

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clock;
pub mod command;
pub mod config;
pub mod defaults;
pub mod error;
pub mod inject;
pub mod monitor;
pub mod stt;

// Core traits (source → classify → accumulate → dispatch → execute)
pub use audio::classifier::FrameClassifier;
pub use audio::recorder::AudioSource;
pub use inject::executor::{CommandExecutor, SystemCommandExecutor};
pub use inject::keystroke::{ActionExecutor, KeystrokeExecutor};
pub use stt::transcriber::Transcriber;

// Monitoring pipeline
pub use monitor::{
    MonitorSession, SegmentAccumulator, SessionConfig, SessionHandle, SessionStats,
};

// Command resolution
pub use command::{ActionId, CommandResolver, CommandTable, Resolution};

// Error handling
pub use error::{Result, VoicekeyError};

// Config
pub use config::Config;

// Reporting (for advanced users)
pub use monitor::report::{ErrorReporter, LogReporter, StageError};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
