//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; the per-run attempt log is a
//! separate file sink (see [`crate::simulator::FileSink`]).

use crate::error::{Error, Result};

/// Default filter when `RUST_LOG` is unset. Keeps the console to the
/// success-rate lines unless more is asked for.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global `tracing` subscriber.
pub fn init_logging(default_filter: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
