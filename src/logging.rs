//! Diagnostic sink for LedgerKV
//!
//! The store reports through `tracing`. By default its events reach
//! whatever global subscriber the host application installed. A store can
//! instead be pointed at its own file: events are then dispatched to a
//! private `fmt` subscriber that appends plain-text lines to that file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::error::{LedgerError, Result};

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Forward to the global/default `tracing` subscriber
    Global,
    /// Append to a file (never rotated)
    File(PathBuf),
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter
    pub level: String,
    /// Output destination
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Global,
        }
    }
}

impl LogConfig {
    /// Create config with info level
    pub fn info() -> Self {
        Self::default()
    }

    /// Create config with debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Set log output to a file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }
}

/// Per-store destination for diagnostic messages
///
/// Never fails once built: every logging call is fire-and-forget.
pub struct DiagnosticSink {
    dispatch: Option<Dispatch>,
    output: LogOutput,
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("output", &self.output)
            .finish()
    }
}

impl DiagnosticSink {
    /// Build a sink from a logging configuration
    ///
    /// For file output the parent directory is created and the file is
    /// opened in append mode.
    pub fn open(config: &LogConfig) -> Result<Self> {
        let path = match &config.output {
            LogOutput::Global => {
                return Ok(Self {
                    dispatch: None,
                    output: LogOutput::Global,
                })
            }
            LogOutput::File(path) => path,
        };

        if path.as_os_str().is_empty() {
            return Err(LedgerError::invalid_input("log file path cannot be empty"));
        }

        let filter = EnvFilter::try_new(&config.level)
            .map_err(|e| LedgerError::Config(format!("invalid log level '{}': {}", config.level, e)))?;

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(directory)?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| LedgerError::invalid_input(format!("log file path has no file name: {}", path.display())))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(directory)
            .map_err(|e| LedgerError::Config(format!("cannot open log file {}: {}", path.display(), e)))?;

        let subscriber = tracing_subscriber::fmt()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(false)
            .with_env_filter(filter)
            .finish();

        Ok(Self {
            dispatch: Some(Dispatch::new(subscriber)),
            output: config.output.clone(),
        })
    }

    /// Sink that forwards to the global subscriber
    pub fn global() -> Self {
        Self {
            dispatch: None,
            output: LogOutput::Global,
        }
    }

    pub fn output(&self) -> &LogOutput {
        &self.output
    }

    /// Run `f` with this sink as the current dispatcher
    ///
    /// Any `tracing` event emitted inside `f` lands in this sink.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    // =========================================================================
    // Leveled text messages
    // =========================================================================

    pub fn debug(&self, message: &str) {
        self.scope(|| tracing::debug!("{}", message));
    }

    pub fn info(&self, message: &str) {
        self.scope(|| tracing::info!("{}", message));
    }

    pub fn warning(&self, message: &str) {
        self.scope(|| tracing::warn!("{}", message));
    }

    pub fn error(&self, message: &str) {
        self.scope(|| tracing::error!("{}", message));
    }
}
