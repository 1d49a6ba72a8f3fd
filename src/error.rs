//! Error types for the SMS simulator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SMS simulator.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log sink write failed: {0}")]
    Sink(#[source] io::Error),

    #[error("failed to register signal handlers: {0}")]
    Signal(#[source] io::Error),

    #[error("failed to init logging: {0}")]
    Logging(String),
}

impl Error {
    /// Whether the error happened before any attempt could run.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Io { .. } | Error::Signal(_) | Error::Logging(_)
        )
    }
}
