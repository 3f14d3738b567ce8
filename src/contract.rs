//! Store contract
//!
//! The method surface any LedgerKV-compatible store exposes. Carries no
//! logic of its own.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::index::IndexEntry;

/// Key-value store backed by a recoverable log
///
/// `set`, `get` and `delete` only return `Err` for invalid input. Storage
/// faults are logged and surface as `Ok(false)` / `Ok(None)`.
pub trait KeyValueStore {
    /// Write `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<bool>;

    /// Read the current value of `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove `key`
    fn delete(&self, key: &str) -> Result<bool>;

    /// Rebuild in-memory state from the durable log
    fn recovery(&self);

    /// Point diagnostic output at a file
    fn set_log_file_path(&self, path: &Path) -> Result<()>;

    /// Switch the durable log to another file (no recovery is triggered)
    fn set_recovery_file_path(&self, path: &Path) -> Result<()>;

    /// Read-only copy of the in-memory index
    fn index(&self) -> HashMap<String, IndexEntry>;
}
