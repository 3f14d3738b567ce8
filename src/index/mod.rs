//! Index Module
//!
//! In-memory map from key to the log offset of its most recent record.
//!
//! ## Responsibilities
//! - Last-write-wins: each key points at the last record appended for it
//! - Tombstoned keys keep their offset but read as absent
//! - Never persisted; rebuilt from the log by recovery
//!
//! ## Data Structure Choice
//! A plain `HashMap`. The store wraps it in a `RwLock` so lookups from
//! `get` are safe against concurrent `set`/`delete`.

mod keydir;

pub use keydir::KeyIndex;

/// Entry stored in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Offset of the header of the key's most recent record
    pub offset: u64,

    /// `false` if that record is a tombstone
    pub present: bool,
}

impl IndexEntry {
    pub fn live(offset: u64) -> Self {
        Self { offset, present: true }
    }

    pub fn tombstone(offset: u64) -> Self {
        Self { offset, present: false }
    }
}
