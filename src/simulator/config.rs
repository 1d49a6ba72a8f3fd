//! Simulation configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    BASE_SUCCESS_PROBABILITY, DEFAULT_LOG_DIR, INTERVAL_MAX_SECS, INTERVAL_MIN_SECS,
    POLL_INTERVAL_MS,
};
use crate::error::{Error, Result};

/// Configuration for a simulator run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Country the simulated traffic is attributed to
    pub country: String,

    /// Operator the simulated traffic is attributed to
    pub operator: String,

    /// Directory the per-run log file is created in
    pub log_dir: PathBuf,

    /// Probability that an attempt succeeds, independent of its delay bucket
    pub success_probability: f64,

    /// Lower bound of the pause between attempts, in seconds
    pub interval_min_secs: f64,

    /// Upper bound (exclusive) of the pause between attempts, in seconds
    pub interval_max_secs: f64,

    /// How often a pause re-checks for a shutdown request
    pub poll_interval: Duration,
}

impl SimConfig {
    pub fn new(country: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            operator: operator.into(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            success_probability: BASE_SUCCESS_PROBABILITY,
            interval_min_secs: INTERVAL_MIN_SECS,
            interval_max_secs: INTERVAL_MAX_SECS,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }

    /// Same pair, logging under a different directory.
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Check the values before any state or file is created.
    ///
    /// Country and operator end up in the log file name, so they must be
    /// non-blank and free of path separators.
    pub fn validate(&self) -> Result<()> {
        check_name("country", &self.country)?;
        check_name("operator", &self.operator)?;

        if !(0.0..=1.0).contains(&self.success_probability) {
            return Err(Error::Config(format!(
                "success probability {} is outside [0, 1]",
                self.success_probability
            )));
        }
        if !(self.interval_min_secs >= 0.0 && self.interval_min_secs < self.interval_max_secs) {
            return Err(Error::Config(format!(
                "invalid interval range [{}, {})",
                self.interval_min_secs, self.interval_max_secs
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".into()));
        }
        Ok(())
    }
}

fn check_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    if value.contains(['/', '\\']) {
        return Err(Error::Config(format!(
            "{field} {value:?} must not contain a path separator"
        )));
    }
    Ok(())
}
