//! Write-Ahead Log (WAL) Module
//!
//! The log is the store's only durable state.
//!
//! ## Responsibilities
//! - Append records under an exclusive advisory lock
//! - Positioned reads under a shared lock
//! - Sequential replay to rebuild the index
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Record 1                                                  │
//! │ ┌──────────┬─────────────┬─────────────┬──────┬────────┐  │
//! │ │ Time (4) │ Key Len (4) │ Val Len (4) │ Key  │ Value  │  │
//! │ └──────────┴─────────────┴─────────────┴──────┴────────┘  │
//! ├───────────────────────────────────────────────────────────┤
//! │ Record 2 (tombstone: Val Len = 0, no value bytes)         │
//! │ ┌──────────┬─────────────┬─────────────┬──────┐           │
//! │ │ Time (4) │ Key Len (4) │   0   (4)   │ Key  │           │
//! │ └──────────┴─────────────┴─────────────┴──────┘           │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod lock;
mod reader;
mod record;
mod recovery;
mod writer;

pub use lock::{FileLockGuard, LockMode};
pub use reader::{WalReader, WalScanner};
pub use record::{current_timestamp, length_field, Record, RecordHeader, HEADER_SIZE, MAX_FIELD_LEN};
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::WalWriter;
