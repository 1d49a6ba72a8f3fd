//! Counters and the records derived from them.

use chrono::{DateTime, Local};
use std::fmt;

use super::delay::BucketKind;

/// Running state of one simulator process.
///
/// `total_attempts == successful_attempts + failed_attempts` after every
/// completed attempt; `record` is the only mutator of the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    pub country: String,
    pub operator: String,
    total_attempts: u64,
    successful_attempts: u64,
    failed_attempts: u64,
    running: bool,
}

impl SimulationState {
    pub fn new(country: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            operator: operator.into(),
            total_attempts: 0,
            successful_attempts: 0,
            failed_attempts: 0,
            running: true,
        }
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn successful_attempts(&self) -> u64 {
        self.successful_attempts
    }

    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Count one finished attempt. Returns its sequence number.
    pub fn record(&mut self, success: bool) -> u64 {
        self.total_attempts += 1;
        if success {
            self.successful_attempts += 1;
        } else {
            self.failed_attempts += 1;
        }
        self.total_attempts
    }

    /// Percentage of successful attempts, 0.0 before the first attempt.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.successful_attempts as f64 / self.total_attempts as f64 * 100.0
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total_attempts,
            successful: self.successful_attempts,
            failed: self.failed_attempts,
            success_rate: self.success_rate(),
        }
    }
}

/// One logged attempt. Written to the sink and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Local>,
    pub sequence: u64,
    pub success: bool,
    pub bucket: BucketKind,
    pub delay_secs: f64,
    pub success_rate: f64,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SMS attempt #{} - Success: {}, Delay: {:.2}s, Success Rate: {:.2}%",
            self.sequence, self.success, self.delay_secs, self.success_rate
        )
    }
}

/// Final counters reported on shutdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub success_rate: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shutting down. Total Attempts: {}, Successful: {}, Failed: {}, Final Success Rate: {:.2}%",
            self.total, self.successful, self.failed, self.success_rate
        )
    }
}
