//! Error types for LedgerKV
//!
//! Provides a unified error type for all operations.
//!
//! Two severities flow through this type:
//! - input errors (`InvalidInput`) are returned to callers of the store API
//! - every other variant is a storage-layer fault that the store logs and
//!   turns into a negative result (`false` / not found)

use thiserror::Error;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for LedgerKV operations
#[derive(Debug, Error)]
pub enum LedgerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Log Corruption Errors
    // -------------------------------------------------------------------------
    #[error("Truncated header at offset {offset}: {available} of 12 bytes available")]
    TruncatedHeader { offset: u64, available: usize },

    #[error("Corrupted key at offset {offset}")]
    CorruptedKey { offset: u64 },

    #[error("Corrupted value at offset {offset}")]
    CorruptedValue { offset: u64 },

    #[error("Key at offset {offset} is not valid UTF-8")]
    InvalidKeyEncoding { offset: u64 },

    // -------------------------------------------------------------------------
    // Locking Errors
    // -------------------------------------------------------------------------
    #[error("File lock error: {0}")]
    Lock(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Create an input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for caller mistakes (the only errors the store API returns)
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// True for errors raised while decoding a damaged log
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHeader { .. }
                | Self::CorruptedKey { .. }
                | Self::CorruptedValue { .. }
                | Self::InvalidKeyEncoding { .. }
        )
    }
}
