//! Store Module
//!
//! The public set/get/delete surface and the locking discipline around
//! the WAL and the index.
//!
//! ## Responsibilities
//! - Validate caller input
//! - Serialize appends and index mutations within the process
//! - Read values straight from the log through the index
//! - Rebuild the index from the log on open and on demand

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::config::{Config, SyncStrategy};
use crate::contract::KeyValueStore;
use crate::error::{LedgerError, Result};
use crate::index::{IndexEntry, KeyIndex};
use crate::logging::{DiagnosticSink, LogConfig, LogOutput};
use crate::wal::{Record, WalReader, WalRecovery, WalWriter, MAX_FIELD_LEN};

/// A single-file, log-structured key-value store
///
/// ## Concurrency Model
///
/// - **Writes** (set/delete/recovery/path swap): serialized by the `writer`
///   mutex, then an exclusive file lock for the append itself
///   - Lock order: writer → file lock → index (write)
///
/// - **Reads** (get): no writer mutex
///   - Index read lock held only to copy the entry out
///   - Fresh read handle with a shared file lock for the positioned read
///
/// File locks are advisory: they coordinate processes (or other `Store`
/// instances) using the same log path, not arbitrary writers.
pub struct Store {
    /// Append handle; its mutex is the process-local write lock
    writer: Mutex<WalWriter>,

    /// Path readers open; swapped together with `writer`
    wal_path: RwLock<PathBuf>,

    /// Key → offset of the most recent record
    index: RwLock<KeyIndex>,

    /// Destination of this store's diagnostics
    diagnostics: RwLock<DiagnosticSink>,

    sync_strategy: SyncStrategy,
    log_level: String,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Build the diagnostic sink
    /// 2. Open/create the WAL
    /// 3. Replay the WAL into the index (failures are logged, not returned)
    pub fn open(config: Config) -> Result<Self> {
        if config.wal_path.as_os_str().is_empty() {
            return Err(LedgerError::invalid_input("WAL path cannot be empty"));
        }

        let diagnostics = DiagnosticSink::open(&config.logging)?;
        let writer = WalWriter::open(&config.wal_path, config.sync_strategy)?;

        let store = Self {
            writer: Mutex::new(writer),
            wal_path: RwLock::new(config.wal_path),
            index: RwLock::new(KeyIndex::new()),
            diagnostics: RwLock::new(diagnostics),
            sync_strategy: config.sync_strategy,
            log_level: config.logging.level,
        };

        store.recovery();
        Ok(store)
    }

    /// Open with a WAL path (convenience method)
    ///
    /// Uses default config with the specified WAL path
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().wal_path(path).build())
    }

    /// Set `key` to `value`
    ///
    /// Returns `Err` only for an empty key or value. Returns `Ok(false)`
    /// if the append failed.
    pub fn set(&self, key: &str, value: &str) -> Result<bool> {
        self.validate_key(key)?;
        if value.is_empty() {
            return Err(self.reject("value must be a non-empty string"));
        }
        if value.len() > MAX_FIELD_LEN {
            return Err(self.reject("value exceeds the maximum record field length"));
        }

        Ok(self.append(Record::put(key, value)))
    }

    /// Get the value of `key`
    ///
    /// Returns `Err` only for an empty key. Absent keys, tombstoned keys
    /// and failed reads all yield `Ok(None)`.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.validate_key(key)?;

        let entry = self.index.read().entry(key);
        let offset = match entry {
            None => {
                self.log(|| tracing::warn!(key, "key not found"));
                return Ok(None);
            }
            Some(entry) if !entry.present => {
                self.log(|| tracing::warn!(key, offset = entry.offset, "key is deleted"));
                return Ok(None);
            }
            Some(entry) => entry.offset,
        };

        match self.read_value(key, offset) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.log(|| tracing::error!(key, offset, error = %e, "error getting key"));
                Ok(None)
            }
        }
    }

    /// Delete `key` by appending a tombstone
    ///
    /// Deleting a key that was never set still appends a tombstone.
    /// Returns `Err` only for an empty key.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.validate_key(key)?;
        Ok(self.append(Record::tombstone(key)))
    }

    /// Rebuild the index by replaying the WAL
    ///
    /// Never fails: a damaged log is logged and the index keeps every
    /// record that precedes the damage.
    pub fn recovery(&self) {
        let _writer = self.writer.lock();
        let path = self.wal_path.read().clone();

        let mut rebuilt = KeyIndex::new();
        let outcome = self.log(|| WalRecovery::replay(&path, &mut rebuilt));
        let keys = rebuilt.len();
        *self.index.write() = rebuilt;

        match outcome {
            Ok(result) => self.log(|| {
                tracing::info!(
                    path = %path.display(),
                    records = result.records_replayed,
                    tombstones = result.tombstones_replayed,
                    bytes = result.bytes_scanned,
                    keys,
                    "recovery completed successfully"
                )
            }),
            Err(e) => self.log(|| {
                tracing::error!(path = %path.display(), keys, error = %e, "error during recovery")
            }),
        }
    }

    /// Send diagnostics to a file from now on
    pub fn set_log_file_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(self.reject("log file path cannot be empty"));
        }

        let config = LogConfig::default()
            .with_level(self.log_level.clone())
            .with_file(path);
        let sink = DiagnosticSink::open(&config)?;
        *self.diagnostics.write() = sink;

        self.log(|| tracing::info!(path = %path.display(), "log file path set"));
        Ok(())
    }

    /// Switch the WAL to another file
    ///
    /// Closes the current handle and opens (or creates) the new file.
    /// The index is left as is; call [`Store::recovery`] to load the new log.
    pub fn set_recovery_file_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(self.reject("recovery file path cannot be empty"));
        }

        let mut writer = self.writer.lock();
        let reopened = self.log(|| WalWriter::open(path, self.sync_strategy)).map_err(|e| {
            self.log(|| tracing::error!(path = %path.display(), error = %e, "cannot open recovery file"));
            e
        })?;
        *writer = reopened;
        *self.wal_path.write() = path.to_path_buf();

        self.log(|| tracing::info!(path = %path.display(), "recovery file path set"));
        Ok(())
    }

    /// Close the store gracefully, syncing the WAL to disk
    pub fn close(self) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Read-only copy of the index
    pub fn index(&self) -> HashMap<String, IndexEntry> {
        self.index.read().snapshot()
    }

    /// Index entry for one key, tombstones included
    pub fn index_entry(&self, key: &str) -> Option<IndexEntry> {
        self.index.read().entry(key)
    }

    /// Number of keys with a live value
    pub fn live_keys(&self) -> usize {
        self.index.read().live_count()
    }

    /// Current WAL path
    pub fn wal_path(&self) -> PathBuf {
        self.wal_path.read().clone()
    }

    /// Current diagnostic destination
    pub fn log_output(&self) -> LogOutput {
        self.diagnostics.read().output().clone()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Append under the write mutex and update the index
    fn append(&self, record: Record) -> bool {
        let mut writer = self.writer.lock();
        let key = record.key.clone();
        let tombstone = record.is_tombstone();

        match self.log(|| writer.append(&record)) {
            Ok(offset) => {
                self.index.write().apply(offset, record);
                if tombstone {
                    self.log(|| tracing::info!(key = %key, offset, "deleted key successfully"));
                } else {
                    self.log(|| tracing::info!(key = %key, offset, "set key successfully"));
                }
                true
            }
            Err(e) => {
                let action = if tombstone { "deleting" } else { "setting" };
                self.log(|| tracing::error!(key = %key, error = %e, "error {} key", action));
                false
            }
        }
    }

    /// Positioned read of the record at `offset`, checked against `key`
    fn read_value(&self, key: &str, offset: u64) -> Result<Option<Vec<u8>>> {
        let path = self.wal_path.read().clone();
        let record = self.log(|| -> Result<Record> {
            WalReader::open(&path)?.read_record_at(offset)
        })?;

        if record.key != key {
            self.log(|| {
                tracing::error!(offset, expected = key, found = %record.key, "key mismatch at offset")
            });
            return Ok(None);
        }

        if record.value.is_none() {
            self.log(|| tracing::error!(key, offset, "index points at a tombstone"));
        }
        Ok(record.value)
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(self.reject("key must be a non-empty string"));
        }
        if key.len() > MAX_FIELD_LEN {
            return Err(self.reject("key exceeds the maximum record field length"));
        }
        Ok(())
    }

    /// Log an input validation failure and build its error
    fn reject(&self, message: &str) -> LedgerError {
        self.log(|| tracing::error!("{}", message));
        LedgerError::invalid_input(message)
    }

    /// Run `f` with this store's diagnostic sink as the default subscriber
    ///
    /// WAL-layer events (lock release failures, rollbacks, replay traces)
    /// raised inside `f` land in the same sink as the store's own.
    fn log<T>(&self, f: impl FnOnce() -> T) -> T {
        self.diagnostics.read().scope(f)
    }
}

impl KeyValueStore for Store {
    fn set(&self, key: &str, value: &str) -> Result<bool> {
        Store::set(self, key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Store::get(self, key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Store::delete(self, key)
    }

    fn recovery(&self) {
        Store::recovery(self)
    }

    fn set_log_file_path(&self, path: &Path) -> Result<()> {
        Store::set_log_file_path(self, path)
    }

    fn set_recovery_file_path(&self, path: &Path) -> Result<()> {
        Store::set_recovery_file_path(self, path)
    }

    fn index(&self) -> HashMap<String, IndexEntry> {
        Store::index(self)
    }
}
