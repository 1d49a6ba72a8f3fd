//! smsim - synthetic SMS delivery simulator.
//!
//! This module exposes the simulator for testing and for the binary.

pub mod build_info;
pub mod constants;
pub mod error;
pub mod logging;
pub mod simulator;

pub use error::{Error, Result};
pub use simulator::{SimConfig, Simulator, Summary};
