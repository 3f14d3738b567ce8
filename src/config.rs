//! Configuration for LedgerKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::logging::LogConfig;

/// Main configuration for a LedgerKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the write-ahead log, the store's only data file.
    /// Created if missing; its parent directory is created too.
    pub wal_path: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// How hard each append pushes bytes towards the disk
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Diagnostics Configuration
    // -------------------------------------------------------------------------
    /// Where the store's diagnostic messages go
    pub logging: LogConfig,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// `sync_data` after every append (safest, slowest)
    EveryWrite,

    /// Flush to the OS only; the kernel decides when the bytes hit disk
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("write_ahead.log"),
            sync_strategy: SyncStrategy::EveryWrite,
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the write-ahead log path
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal_path = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Replace the whole logging configuration
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Append diagnostics to a file instead of the global subscriber
    pub fn diagnostics_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.logging = self.config.logging.with_file(path);
        self
    }

    /// Set the minimum diagnostic level ("debug", "info", "warn", "error")
    pub fn diagnostics_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging = self.config.logging.with_level(level);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
