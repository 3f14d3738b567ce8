//! WAL Writer
//!
//! Owns the append-only handle of the log file.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;
use super::lock::{FileLockGuard, LockMode};
use super::Record;

/// Appends records to the WAL file
///
/// Every append holds an exclusive advisory lock from the moment the
/// offset is taken until the bytes are flushed, so cooperating processes
/// never interleave partial records.
#[derive(Debug)]
pub struct WalWriter {
    file: File,
    path: PathBuf,
    sync_strategy: SyncStrategy,
    records_appended: u64,
}

impl WalWriter {
    /// Open or create a WAL file in read-write-append mode
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            sync_strategy,
            records_appended: 0,
        })
    }

    /// Append a record, returning the offset its header starts at
    ///
    /// The offset is read as end-of-file after the lock is granted, which
    /// accounts for records other processes appended meanwhile. If the
    /// write fails part way the file is cut back to that offset. Records
    /// whose lengths do not fit the header are rejected before locking.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        record.check_lengths()?;
        let bytes = record.encode();

        let _guard = FileLockGuard::acquire(&self.file, LockMode::Exclusive)?;
        let offset = (&self.file).seek(SeekFrom::End(0))?;

        if let Err(e) = (&self.file).write_all(&bytes) {
            if let Err(rollback) = self.file.set_len(offset) {
                tracing::error!(offset, error = %rollback, "failed to roll back torn append");
            }
            return Err(e.into());
        }

        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.file.sync_data()?,
            SyncStrategy::OsBuffered => (&self.file).flush()?,
        }

        self.records_appended += 1;
        Ok(offset)
    }

    /// Offset the next record would land at
    pub fn current_append_offset(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Path of the file this writer appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this handle since it was opened
    pub fn records_appended(&self) -> u64 {
        self.records_appended
    }
}
