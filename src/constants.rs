// Timing constants
pub const POLL_INTERVAL_MS: u64 = 100;
pub const INTERVAL_MIN_SECS: f64 = 3.0;
pub const INTERVAL_MAX_SECS: f64 = 8.0;

// Outcome constants
pub const BASE_SUCCESS_PROBABILITY: f64 = 0.75;

// Log file constants
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const LOG_LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
