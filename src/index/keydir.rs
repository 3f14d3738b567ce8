//! KeyIndex implementation
//!
//! HashMap-based key directory, unsynchronized (callers own the locking).

use std::collections::HashMap;

use super::IndexEntry;
use crate::wal::Record;

/// Key → (offset, present) directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    entries: HashMap<String, IndexEntry>,
}

impl KeyIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `key` at a value record
    pub fn upsert(&mut self, key: impl Into<String>, offset: u64) {
        self.entries.insert(key.into(), IndexEntry::live(offset));
    }

    /// Point `key` at a tombstone record
    ///
    /// Tombstoning an unknown key is not an error; the key is recorded
    /// as absent.
    pub fn tombstone(&mut self, key: impl Into<String>, offset: u64) {
        self.entries.insert(key.into(), IndexEntry::tombstone(offset));
    }

    /// Apply a record found at `offset`, as replay does
    pub fn apply(&mut self, offset: u64, record: Record) {
        if record.is_tombstone() {
            self.tombstone(record.key, offset);
        } else {
            self.upsert(record.key, offset);
        }
    }

    /// Raw entry for `key`, tombstones included
    pub fn entry(&self, key: &str) -> Option<IndexEntry> {
        self.entries.get(key).copied()
    }

    /// Offset of the live record for `key`, `None` if absent or tombstoned
    pub fn lookup(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| entry.present)
            .map(|entry| entry.offset)
    }

    /// Number of keys tracked, tombstones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys with a live value
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.present).count()
    }

    /// Copy of every entry (diagnostics and tests)
    pub fn snapshot(&self) -> HashMap<String, IndexEntry> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
