//! Advisory file locking
//!
//! Whole-file `flock`-style locks (via `fs2`) that coordinate processes
//! sharing one log path. Only holders that follow the same discipline are
//! excluded: a process writing the file without locking is not stopped.
//!
//! - `Exclusive`: held for the whole duration of an append
//! - `Shared`: held for a positioned read or a full-log scan

use std::fs::File;

use fs2::FileExt;

use crate::error::{LedgerError, Result};

/// Lock mode requested on a file handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Excludes every other locker (writers)
    Exclusive,

    /// Coexists with other shared lockers, excludes exclusive ones (readers)
    Shared,
}

/// Scoped lock on a file handle, released on drop
///
/// Acquisition blocks until the lock is granted; there is no timeout.
#[derive(Debug)]
pub struct FileLockGuard<'a> {
    file: &'a File,
    mode: LockMode,
}

impl<'a> FileLockGuard<'a> {
    /// Block until `mode` is granted on `file`
    pub fn acquire(file: &'a File, mode: LockMode) -> Result<Self> {
        let locked = match mode {
            LockMode::Exclusive => FileExt::lock_exclusive(file),
            LockMode::Shared => FileExt::lock_shared(file),
        };

        locked.map_err(|e| LedgerError::Lock(format!("failed to acquire {:?} lock: {}", mode, e)))?;

        Ok(Self { file, mode })
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

/// Release failures are logged to the current default subscriber
impl Drop for FileLockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(self.file) {
            tracing::warn!(error = %e, mode = ?self.mode, "failed to release file lock");
        }
    }
}
