//! # LedgerKV
//!
//! A single-file, log-structured key-value store with:
//! - One append-only write-ahead log as the only durable state
//! - An in-memory index from key to the offset of its latest record
//! - Crash recovery by replaying the log from the start
//! - Advisory file locks so processes can share one log file
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store API                            │
//! │              set / get / delete / recovery                   │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ set/delete                       │ get
//!            │ (write mutex + exclusive lock)   │ (shared lock)
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    WalWriter    │                │    WalReader    │
//!   │    (Append)     │                │ (Positioned)    │
//!   └────────┬────────┘                └────────┬────────┘
//!            │          ┌─────────────┐         │
//!            └─────────►│  Log File   │◄────────┘
//!                       └──────┬──────┘
//!                              │ replay
//!                              ▼
//!                       ┌─────────────┐
//!                       │  KeyIndex   │
//!                       │  (RwLock)   │
//!                       └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod logging;

pub mod wal;
pub mod index;
pub mod contract;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LedgerError, Result};
pub use config::{Config, SyncStrategy};
pub use contract::KeyValueStore;
pub use index::IndexEntry;
pub use logging::{LogConfig, LogOutput};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LedgerKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
