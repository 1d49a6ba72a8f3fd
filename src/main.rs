//! SMS delivery simulator CLI.
//!
//! Usage:
//!   sms_simulator --country <COUNTRY> --operator <OPERATOR>
//!
//! Runs until SIGINT/SIGTERM, appending every attempt to
//! `logs/<program>.<country>_<operator>.<YYYYMMDD_HHMMSS>.log`.

use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use smsim::build_info;
use smsim::logging::{init_logging, DEFAULT_LOG_FILTER};
use smsim::simulator::{log_file_path, program_name, FileSink, ShutdownSignal};
use smsim::{Result, SimConfig, Simulator, Summary};

/// Simulate outbound SMS delivery for a country/operator pair.
#[derive(Parser, Debug)]
#[command(name = "sms_simulator", version, long_version = build_info::LONG_VERSION)]
struct Cli {
    /// Country name
    #[arg(long)]
    country: String,

    /// Operator name
    #[arg(long)]
    operator: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(DEFAULT_LOG_FILTER) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(summary) => {
            info!(total = summary.total, "Exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_startup() {
                error!("Failed to start simulator: {}", e);
            } else {
                error!("Simulator aborted: {}", e);
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Summary> {
    let config = SimConfig::new(cli.country, cli.operator);
    config.validate()?;

    let shutdown = ShutdownSignal::install(config.poll_interval)?;

    let path = log_file_path(
        &config.log_dir,
        &program_name(),
        &config.country,
        &config.operator,
        Local::now(),
    );
    let sink = FileSink::create(&path)?;
    info!(
        path = %sink.path().display(),
        commit = build_info::BUILD_COMMIT,
        "Logging attempts"
    );

    let mut simulator = Simulator::new(
        config,
        StdRng::from_entropy(),
        sink,
        io::stdout(),
        shutdown,
    );
    simulator.start()?;
    simulator.run_forever()
}
