//! Synthetic SMS delivery simulator.
//!
//! Sends nothing: every attempt's delay and outcome come from an in-process
//! generator. Counters live in [`SimulationState`]; each attempt is appended
//! to a [`LogSink`] and the running success rate goes to the console.

mod config;
mod delay;
mod runner;
mod shutdown;
mod sink;
mod state;

pub use config::SimConfig;
pub use delay::{select_bucket, BucketKind, DelayBucket, DELAY_BUCKETS};
pub use runner::Simulator;
pub use shutdown::{Pause, ShutdownSignal};
pub use sink::{format_log_line, log_file_path, program_name, FileSink, LogSink, MemorySink};
pub use state::{AttemptRecord, SimulationState, Summary};
