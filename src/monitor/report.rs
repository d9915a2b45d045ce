//! Error reporting for the monitoring pipeline stages.

use std::fmt;

/// Errors surfaced by a pipeline stage (capture, classify, dispatch, execute).
#[derive(Debug, Clone)]
pub enum StageError {
    /// Recoverable error; the stage continues processing.
    Recoverable(String),
    /// Fatal error; the session must shut down.
    Fatal(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StageError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}

/// Trait for reporting stage errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a stage.
    fn report(&self, stage: &str, error: &StageError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &StageError) {
        eprintln!("voicekey [{}] {}", stage, error);
    }
}
