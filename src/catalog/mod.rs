pub mod loader;

use std::collections::HashMap;

use serde::Deserialize;

/// One frequently asked question with its canned answer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QaEntry {
    /// Stable identifier, also used verbatim as the button payload
    pub id: String,
    /// Button text
    pub question: String,
    /// Full answer sent as a separate message
    pub answer: String,
}

/// Immutable, ordered set of questions loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct QaCatalog {
    entries: Vec<QaEntry>,
    index: HashMap<String, usize>,
}

impl QaCatalog {
    /// Build a catalog from entries whose ids are already known to be unique.
    /// Use [`loader::load_catalog`] for untrusted input.
    pub(crate) fn from_entries(entries: Vec<QaEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.id.clone(), pos))
            .collect();
        Self { entries, index }
    }

    /// Find an entry by its exact (case-sensitive) id
    pub fn lookup(&self, id: &str) -> Option<&QaEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Entries in menu order
    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn entry(id: &str, question: &str, answer: &str) -> QaEntry {
    QaEntry {
        id: id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}
