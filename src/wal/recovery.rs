//! WAL Recovery
//!
//! Rebuilds the key index by replaying the log from offset 0.
//!
//! Single pass, no retries: `scanning → done | corrupted`. The scan runs
//! under a shared lock on a dedicated read handle. On the first damaged
//! record replay stops with an error; everything applied before that point
//! stays in the caller's index.

use std::path::Path;

use crate::error::Result;
use crate::index::KeyIndex;
use super::WalReader;

/// Handles index reconstruction from the WAL
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Value records applied
    pub records_replayed: u64,

    /// Tombstone records applied
    pub tombstones_replayed: u64,

    /// Bytes of well-formed records scanned (the end offset of the log)
    pub bytes_scanned: u64,
}

impl RecoveryResult {
    /// Total records applied
    pub fn total_records(&self) -> u64 {
        self.records_replayed + self.tombstones_replayed
    }
}

impl WalRecovery {
    /// Replay the WAL at `path` into `index`
    ///
    /// `index` is cleared first. On a corruption error the records before
    /// the damaged one have already been applied.
    pub fn replay(path: &Path, index: &mut KeyIndex) -> Result<RecoveryResult> {
        index.clear();

        let reader = WalReader::open(path)?;
        let mut result = RecoveryResult::default();

        for item in reader.scan()? {
            let (offset, record) = item?;
            tracing::trace!(offset, key = %record.key, tombstone = record.is_tombstone(), "replaying record");

            if record.is_tombstone() {
                result.tombstones_replayed += 1;
            } else {
                result.records_replayed += 1;
            }
            result.bytes_scanned = offset + record.encoded_len() as u64;
            index.apply(offset, record);
        }

        Ok(result)
    }

    /// Verify integrity of a WAL file without touching any store
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let mut scratch = KeyIndex::new();
        Self::replay(path, &mut scratch)
    }
}
