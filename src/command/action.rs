//! Action identifiers resolvable from transcribed text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a side effect the executor can perform.
///
/// `Dictate` is the fallback action, fired when no configured keyword
/// matches; it is the only debounced action. `PauseListening` and
/// `ResumeListening` additionally toggle the listening gate inside the
/// dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    Send,
    Clear,
    NewChat,
    ScrollUp,
    ScrollDown,
    Cancel,
    DeleteWord,
    Undo,
    Copy,
    Paste,
    PauseListening,
    ResumeListening,
    Dictate,
}

impl ActionId {
    /// Stable lowercase name, matching the configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionId::Send => "send",
            ActionId::Clear => "clear",
            ActionId::NewChat => "new_chat",
            ActionId::ScrollUp => "scroll_up",
            ActionId::ScrollDown => "scroll_down",
            ActionId::Cancel => "cancel",
            ActionId::DeleteWord => "delete_word",
            ActionId::Undo => "undo",
            ActionId::Copy => "copy",
            ActionId::Paste => "paste",
            ActionId::PauseListening => "pause_listening",
            ActionId::ResumeListening => "resume_listening",
            ActionId::Dictate => "dictate",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
