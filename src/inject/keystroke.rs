//! Keystroke-based action execution for Wayland.
//!
//! Maps each [`ActionId`] onto a ydotool key chord. ydotool takes Linux
//! input key codes with `:1` (press) / `:0` (release) suffixes, e.g.
//! `key 29:1 47:1 47:0 29:0` for Ctrl+V.

use crate::command::ActionId;
use crate::defaults;
use crate::error::Result;
use crate::inject::executor::{CommandExecutor, SystemCommandExecutor};

// Linux input event key codes (input-event-codes.h).
const KEY_ESC: u32 = 1;
const KEY_BACKSPACE: u32 = 14;
const KEY_ENTER: u32 = 28;
const KEY_LEFTCTRL: u32 = 29;
const KEY_A: u32 = 30;
const KEY_Z: u32 = 44;
const KEY_C: u32 = 46;
const KEY_V: u32 = 47;
const KEY_N: u32 = 49;
const KEY_UP: u32 = 103;
const KEY_DOWN: u32 = 108;

/// Trait for performing the side effect of a resolved action.
///
/// Fire-and-forget from the core's point of view: errors are reported by the
/// dispatch path, never propagated into segment detection.
pub trait ActionExecutor: Send {
    /// Perform the side effect for `action`.
    fn execute(&mut self, action: ActionId) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "executor"
    }
}

/// Executes actions by injecting key chords through a [`CommandExecutor`].
pub struct KeystrokeExecutor<E: CommandExecutor> {
    executor: E,
    dictation_keycode: u32,
}

impl KeystrokeExecutor<SystemCommandExecutor> {
    /// Create a KeystrokeExecutor with the system command executor.
    pub fn system() -> Self {
        Self::new(SystemCommandExecutor::new())
    }
}

impl<E: CommandExecutor> KeystrokeExecutor<E> {
    /// Create a KeystrokeExecutor with the given executor.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            dictation_keycode: defaults::DICTATION_KEYCODE,
        }
    }

    /// Override the key code used for the dictation trigger.
    pub fn with_dictation_keycode(mut self, keycode: u32) -> Self {
        self.dictation_keycode = keycode;
        self
    }

    /// Press and release each key in order, then release in reverse: a chord.
    fn chord(&self, keys: &[u32]) -> Result<()> {
        let mut args: Vec<String> = vec!["key".to_string()];
        for key in keys {
            args.push(format!("{}:1", key));
        }
        for key in keys.iter().rev() {
            args.push(format!("{}:0", key));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor.execute("ydotool", &arg_refs)?;
        Ok(())
    }

    /// Tap a single key `count` times.
    fn tap(&self, key: u32, count: u32) -> Result<()> {
        let mut args: Vec<String> = vec!["key".to_string()];
        for _ in 0..count {
            args.push(format!("{}:1", key));
            args.push(format!("{}:0", key));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor.execute("ydotool", &arg_refs)?;
        Ok(())
    }
}

impl<E: CommandExecutor> ActionExecutor for KeystrokeExecutor<E> {
    fn execute(&mut self, action: ActionId) -> Result<()> {
        match action {
            ActionId::Send => self.tap(KEY_ENTER, 1),
            ActionId::Clear => {
                // Select all, then delete
                self.chord(&[KEY_LEFTCTRL, KEY_A])?;
                self.tap(KEY_BACKSPACE, 1)
            }
            ActionId::NewChat => self.chord(&[KEY_LEFTCTRL, KEY_N]),
            ActionId::ScrollUp => self.tap(KEY_UP, 3),
            ActionId::ScrollDown => self.tap(KEY_DOWN, 3),
            ActionId::Cancel => self.tap(KEY_ESC, 1),
            ActionId::DeleteWord => self.chord(&[KEY_LEFTCTRL, KEY_BACKSPACE]),
            ActionId::Undo => self.chord(&[KEY_LEFTCTRL, KEY_Z]),
            ActionId::Copy => self.chord(&[KEY_LEFTCTRL, KEY_C]),
            ActionId::Paste => self.chord(&[KEY_LEFTCTRL, KEY_V]),
            // Listening toggles only flip the dispatch gate; no keys involved
            ActionId::PauseListening | ActionId::ResumeListening => Ok(()),
            // Double-tap, mirroring the dictation shortcut it emulates
            ActionId::Dictate => self.tap(self.dictation_keycode, 2),
        }
    }

    fn name(&self) -> &'static str {
        "keystroke"
    }
}

/// Action executor for tests: records every action, optionally failing.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    actions: std::sync::Arc<std::sync::Mutex<Vec<ActionId>>>,
    should_fail: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the executor to fail on every action.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Actions executed so far, in order.
    pub fn actions(&self) -> Vec<ActionId> {
        #[allow(clippy::unwrap_used)]
        let actions = self.actions.lock().unwrap();
        actions.clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, action: ActionId) -> Result<()> {
        #[allow(clippy::unwrap_used)]
        self.actions.lock().unwrap().push(action);
        if self.should_fail {
            Err(crate::error::VoicekeyError::ActionFailed {
                message: "recording executor failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
