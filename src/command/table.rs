//! Ordered keyword-to-action table.

use crate::command::action::ActionId;

/// One keyword binding: a phrase and the action it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    phrase: String,
    action: ActionId,
}

impl CommandEntry {
    /// The phrase, lowercased at construction.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// The bound action.
    pub fn action(&self) -> ActionId {
        self.action
    }
}

/// Ordered mapping from keyword phrase to action.
///
/// Insertion order defines match priority; the table is immutable after
/// construction. Phrases are matched case-insensitively as substrings of the
/// transcribed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    /// Builds a table from ordered (phrase, action) pairs.
    ///
    /// Phrases are lowercased; empty phrases are skipped since an empty
    /// substring would match every text.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ActionId)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(phrase, action)| CommandEntry {
                phrase: phrase.into().to_lowercase(),
                action,
            })
            .filter(|e| !e.phrase.is_empty())
            .collect();
        Self { entries }
    }

    /// An empty table: every resolution falls back to dictation.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in binding set used when the configuration defines none.
    pub fn default_table() -> Self {
        Self::new([
            ("send", ActionId::Send),
            ("clear", ActionId::Clear),
            ("new chat", ActionId::NewChat),
            ("scroll up", ActionId::ScrollUp),
            ("scroll down", ActionId::ScrollDown),
            ("cancel", ActionId::Cancel),
            ("delete", ActionId::DeleteWord),
            ("undo", ActionId::Undo),
            ("copy", ActionId::Copy),
            ("paste", ActionId::Paste),
            ("stop listening", ActionId::PauseListening),
            ("start listening", ActionId::ResumeListening),
        ])
    }

    /// Entries in priority order.
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
