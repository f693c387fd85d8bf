//! Error types for the intersection controller.
//!
//! - [`SimulationError`] — fatal failures that stop the process.
//! - [`ConfigError`] — a configuration file that could not be used.
//! - [`EventParseError`] — a single malformed event line (skipped, never fatal).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that end the simulation before (or instead of) a normal exit.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The status log could not be opened; nothing has started yet.
    #[error("cannot open log sink {path:?}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An explicitly requested configuration file could not be loaded.
    #[error("cannot load configuration {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// A worker thread panicked.
    #[error("{worker} worker failed: {message}")]
    Worker {
        worker: &'static str,
        message: String,
    },
}

impl SimulationError {
    /// Process exit status for this failure. Each variant gets its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimulationError::LogSink { .. } => 1,
            SimulationError::Config { .. } => 2,
            SimulationError::Worker { .. } => 3,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Why an event line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventParseError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
