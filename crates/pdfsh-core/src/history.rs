//! Command history: a bounded, append-only log persisted across sessions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryStoreError;

/// Default cap on the number of retained history entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// One recorded shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command_text: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(command_text: impl Into<String>) -> Self {
        Self {
            command_text: command_text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Durable backing store for [`History`].
///
/// Entries are stored in order, oldest first.
pub trait HistoryStore: Send {
    /// Reads every stored entry.
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryStoreError>;

    /// Appends a single entry.
    fn append(&mut self, entry: &HistoryEntry) -> Result<(), HistoryStoreError>;

    /// Replaces the stored entries. Used to drop evicted entries at startup.
    fn rewrite(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryStoreError>;
}

/// A [`HistoryStore`] that keeps entries in memory only.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    entries: Vec<HistoryEntry>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryStoreError> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), HistoryStoreError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn rewrite(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryStoreError> {
        self.entries = entries.to_vec();
        Ok(())
    }
}

/// Bounded command history, most recent last.
///
/// When the cap is exceeded the oldest entries are evicted first. Evictions
/// happen immediately in memory; the store drops them on the next startup.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
    store: Box<dyn HistoryStore>,
}

impl History {
    /// Loads the existing entries from `store`, keeping at most `max_entries`.
    pub fn load(
        store: Box<dyn HistoryStore>,
        max_entries: usize,
    ) -> Result<Self, HistoryStoreError> {
        let max_entries = max_entries.max(1);
        let mut store = store;
        let mut stored = store.load()?;

        if stored.len() > max_entries {
            let evicted = stored.len() - max_entries;
            stored.drain(..evicted);
            store.rewrite(&stored)?;
            tracing::info!("[History] Compacted store, dropped {} old entries", evicted);
        }

        Ok(Self {
            entries: stored.into(),
            max_entries,
            store,
        })
    }

    /// A history backed by an empty in-memory store.
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
            store: Box::new(InMemoryHistoryStore::new()),
        }
    }

    /// Records `entry`, evicting the oldest entries over the cap.
    ///
    /// The in-memory log is updated even when persisting fails; the store error is
    /// returned so the caller can report it.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), HistoryStoreError> {
        let persisted = self.store.append(&entry);

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }

        persisted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(history: &History) -> Vec<&str> {
        history.iter().map(|e| e.command_text.as_str()).collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut history = History::in_memory(10);
        history.append(HistoryEntry::now("open a.pdf")).unwrap();
        history.append(HistoryEntry::now("summary")).unwrap();

        assert_eq!(commands(&history), vec!["open a.pdf", "summary"]);
        assert_eq!(history.last().unwrap().command_text, "summary");
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut history = History::in_memory(3);
        for i in 0..5 {
            history.append(HistoryEntry::now(format!("cmd {i}"))).unwrap();
        }

        assert_eq!(commands(&history), vec!["cmd 2", "cmd 3", "cmd 4"]);
    }

    #[test]
    fn test_load_compacts_oversized_store() {
        let entries = (0..5).map(|i| HistoryEntry::now(format!("cmd {i}"))).collect();
        let store = InMemoryHistoryStore::with_entries(entries);

        let history = History::load(Box::new(store), 2).unwrap();

        assert_eq!(commands(&history), vec!["cmd 3", "cmd 4"]);
    }
}
