//! Side-effect execution for resolved actions.
//!
//! OS interaction goes through the [`CommandExecutor`] seam so every
//! executor is fully testable without a desktop session.

pub mod executor;
pub mod keystroke;

pub use executor::{CommandExecutor, MockCommandExecutor, SystemCommandExecutor};
pub use keystroke::{ActionExecutor, KeystrokeExecutor, RecordingExecutor};
