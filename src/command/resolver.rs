//! Maps transcribed text to an action via ordered keyword matching.

use crate::command::action::ActionId;
use crate::command::table::CommandTable;

/// Outcome of resolving a piece of transcribed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A configured keyword matched.
    Command(ActionId),
    /// No keyword matched; the fallback dictation action applies (subject to
    /// the listening gate and debounce in the dispatch path).
    Fallback,
}

/// Keyword resolver over an immutable [`CommandTable`].
///
/// Matching is deliberately simple: lowercase the text, scan the table in
/// insertion order, first phrase contained in the text wins. First-in-order,
/// not longest-match, so behavior is reproducible from the table alone.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    table: CommandTable,
}

impl CommandResolver {
    /// Creates a resolver over the given table.
    pub fn new(table: CommandTable) -> Self {
        Self { table }
    }

    /// Resolves text to exactly one action. Total: every input yields either
    /// a matched command or the fallback.
    pub fn resolve(&self, text: &str) -> Resolution {
        let lowered = text.to_lowercase();
        for entry in self.table.entries() {
            if lowered.contains(entry.phrase()) {
                return Resolution::Command(entry.action());
            }
        }
        Resolution::Fallback
    }

    /// The underlying table.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }
}
