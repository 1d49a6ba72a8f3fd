//! The attempt loop.
//!
//! Each attempt draws a delay bucket, a delay inside it and an outcome, in
//! that order, from the same generator. Outcome and bucket are independent.

use chrono::Local;
use rand::Rng;
use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::config::SimConfig;
use super::delay::select_bucket;
use super::shutdown::Pause;
use super::sink::{format_log_line, LogSink};
use super::state::{AttemptRecord, SimulationState, Summary};
use crate::error::{Error, Result};

/// Simulated SMS sender for one country/operator pair.
pub struct Simulator<R, S, O, P> {
    config: SimConfig,
    state: SimulationState,
    rng: R,
    sink: S,
    console: O,
    pause: P,
    summary: Option<Summary>,
}

impl<R, S, O, P> Simulator<R, S, O, P>
where
    R: Rng,
    S: LogSink,
    O: Write,
    P: Pause,
{
    pub fn new(config: SimConfig, rng: R, sink: S, console: O, pause: P) -> Self {
        let state = SimulationState::new(config.country.clone(), config.operator.clone());
        Self {
            config,
            state,
            rng,
            sink,
            console,
            pause,
            summary: None,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn console(&self) -> &O {
        &self.console
    }

    /// Log the start of the run and print the console banner.
    pub fn start(&mut self) -> Result<()> {
        let banner = format!(
            "Starting SMS Simulator for {} - {}",
            self.state.country, self.state.operator
        );
        self.log(&banner)?;
        self.print(&format!("{}\nUse Ctrl+C to stop the simulation\n", banner));
        Ok(())
    }

    /// Run a single attempt.
    ///
    /// Returns `None` when a stop request arrives during the delivery delay;
    /// the attempt is then dropped without touching the counters.
    pub fn run_one_attempt(&mut self) -> Result<Option<AttemptRecord>> {
        let bucket = select_bucket(self.rng.gen::<f64>());
        let delay_secs = bucket.sample(&mut self.rng);
        debug!(bucket = %bucket.kind, delay_secs, "Attempt drawn");

        if !self.pause.pause(Duration::from_secs_f64(delay_secs)) {
            debug!("Attempt abandoned during delay");
            return Ok(None);
        }

        let success = self.rng.gen::<f64>() < self.config.success_probability;
        let sequence = self.state.record(success);

        let record = AttemptRecord {
            timestamp: Local::now(),
            sequence,
            success,
            bucket: bucket.kind,
            delay_secs,
            success_rate: self.state.success_rate(),
        };

        let line = format_log_line(record.timestamp, &record.to_string());
        self.sink.append(&line).map_err(Error::Sink)?;
        self.print(&format!("Success Rate: {:.2}%", record.success_rate));

        Ok(Some(record))
    }

    /// Keep sending until stopped, then shut down.
    pub fn run_forever(&mut self) -> Result<Summary> {
        while self.state.is_running() && !self.pause.is_stopped() {
            if self.run_one_attempt()?.is_none() {
                break;
            }
            let interval = self
                .rng
                .gen_range(self.config.interval_min_secs..self.config.interval_max_secs);
            if !self.pause.pause(Duration::from_secs_f64(interval)) {
                break;
            }
        }
        self.shutdown()
    }

    /// Stop the loop and report final counters to log and console.
    ///
    /// Only the first call emits the summary; later calls return it again.
    pub fn shutdown(&mut self) -> Result<Summary> {
        if let Some(summary) = self.summary {
            return Ok(summary);
        }
        self.state.stop();

        let summary = self.state.summary();
        self.summary = Some(summary);
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Simulator stopped"
        );

        self.log(&summary.to_string())?;
        self.print(&format!("\n{}", summary));
        Ok(summary)
    }

    /// Write a console line. Only the log sink is fatal; a closed stdout
    /// must not cost the run its log record.
    fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.console, "{}", text).and_then(|_| self.console.flush()) {
            warn!("Console write failed: {}", e);
        }
    }

    fn log(&mut self, message: &str) -> Result<()> {
        let line = format_log_line(Local::now(), message);
        self.sink.append(&line).map_err(Error::Sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::delay::BucketKind;
    use crate::simulator::sink::MemorySink;
    use rand::RngCore;
    use std::collections::VecDeque;

    /// Replays fixed unit draws as `gen::<f64>()` results.
    struct ScriptedRng {
        draws: VecDeque<f64>,
    }

    impl ScriptedRng {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.iter().copied().collect(),
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let draw = self.draws.pop_front().expect("script exhausted");
            // `Standard` builds an f64 from the top 53 bits
            ((draw * (1u64 << 53) as f64) as u64) << 11
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// Never sleeps; stops after a fixed number of completed pauses.
    struct CountingPause {
        budget: usize,
        pauses: Vec<Duration>,
    }

    impl CountingPause {
        fn new(budget: usize) -> Self {
            Self {
                budget,
                pauses: Vec::new(),
            }
        }
    }

    impl Pause for CountingPause {
        fn pause(&mut self, duration: Duration) -> bool {
            if self.budget == 0 {
                return false;
            }
            self.budget -= 1;
            self.pauses.push(duration);
            true
        }

        fn is_stopped(&self) -> bool {
            self.budget == 0
        }
    }

    /// Console whose writes all fail, like stdout after the reader went away.
    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    /// Sink that accepts `capacity` lines and then fails every append.
    struct FullSink {
        capacity: usize,
        lines: Vec<String>,
    }

    impl LogSink for FullSink {
        fn append(&mut self, line: &str) -> std::io::Result<()> {
            if self.lines.len() >= self.capacity {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.lines.push(line.to_string());
            Ok(())
        }
    }

    fn simulator(
        draws: &[f64],
        budget: usize,
    ) -> Simulator<ScriptedRng, MemorySink, Vec<u8>, CountingPause> {
        Simulator::new(
            SimConfig::new("Testland", "TestCo"),
            ScriptedRng::new(draws),
            MemorySink::new(),
            Vec::new(),
            CountingPause::new(budget),
        )
    }

    #[test]
    fn test_quick_bucket_failed_attempt() {
        let mut sim = simulator(&[0.1, 0.5, 0.9], 10);
        let record = sim.run_one_attempt().unwrap().unwrap();

        assert_eq!(record.bucket, BucketKind::Quick);
        assert!(record.delay_secs >= 0.5 && record.delay_secs < 2.0);
        assert!(!record.success);
        assert_eq!(record.sequence, 1);
        assert_eq!(record.success_rate, 0.0);

        let line = &sim.sink().lines[0];
        assert!(line.contains("SMS attempt #1 - Success: false"));
        assert!(line.ends_with("Success Rate: 0.00%"));
        let console = String::from_utf8(sim.console().clone()).unwrap();
        assert_eq!(console, "Success Rate: 0.00%\n");
    }

    #[test]
    fn test_outcome_independent_of_bucket() {
        // Very slow bucket, success draw below threshold
        let mut sim = simulator(&[0.95, 0.5, 0.1], 10);
        let record = sim.run_one_attempt().unwrap().unwrap();
        assert_eq!(record.bucket, BucketKind::VerySlow);
        assert!(record.delay_secs >= 10.0 && record.delay_secs < 15.0);
        assert!(record.success);
        assert_eq!(record.success_rate, 100.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut sim = simulator(&[0.3, 0.0, 0.75], 10);
        let record = sim.run_one_attempt().unwrap().unwrap();
        assert_eq!(record.bucket, BucketKind::Normal);
        assert!(!record.success);
    }

    #[test]
    fn test_pause_receives_drawn_delay() {
        let mut sim = simulator(&[0.7, 0.5, 0.2], 10);
        let record = sim.run_one_attempt().unwrap().unwrap();
        assert_eq!(sim.pause.pauses.len(), 1);
        let slept = sim.pause.pauses[0].as_secs_f64();
        assert!((slept - record.delay_secs).abs() < 1e-6);
        assert!((5.0..10.0).contains(&slept));
    }

    #[test]
    fn test_interrupted_delay_drops_attempt() {
        let mut sim = simulator(&[0.1, 0.5], 0);
        assert!(sim.run_one_attempt().unwrap().is_none());
        assert_eq!(sim.state().total_attempts(), 0);
        assert!(sim.sink().lines.is_empty());
    }

    #[test]
    fn test_run_forever_stops_and_summarizes() {
        // attempt 1: delay pause + interval pause, attempt 2: delay pause,
        // then the interval pause finds the budget spent
        let draws = [0.1, 0.5, 0.2, 0.5, 0.4, 0.5, 0.9, 0.5];
        let mut sim = simulator(&draws, 3);
        let summary = sim.run_forever().unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.success_rate, 50.0);
        assert!(!sim.state().is_running());

        let interval = sim.pause.pauses[1].as_secs_f64();
        assert!((3.0..8.0).contains(&interval));

        let summaries: Vec<&String> = sim
            .sink()
            .lines
            .iter()
            .filter(|l| l.contains("Shutting down."))
            .collect();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].ends_with(
            "Total Attempts: 2, Successful: 1, Failed: 1, Final Success Rate: 50.00%"
        ));
    }

    #[test]
    fn test_shutdown_is_one_shot() {
        let mut sim = simulator(&[], 0);
        let first = sim.shutdown().unwrap();
        let second = sim.shutdown().unwrap();
        assert_eq!(first, second);
        assert_eq!(sim.sink().lines.len(), 1);
    }

    #[test]
    fn test_start_writes_banner() {
        let mut sim = simulator(&[], 0);
        sim.start().unwrap();
        assert!(sim.sink().lines[0].ends_with("Starting SMS Simulator for Testland - TestCo"));
        let console = String::from_utf8(sim.console().clone()).unwrap();
        assert!(console.starts_with("Starting SMS Simulator for Testland - TestCo\n"));
        assert!(console.contains("Use Ctrl+C to stop the simulation"));
    }

    #[test]
    fn test_closed_console_still_logs_summary() {
        let mut sim = Simulator::new(
            SimConfig::new("Testland", "TestCo"),
            ScriptedRng::new(&[0.1, 0.5, 0.2]),
            MemorySink::new(),
            ClosedConsole,
            CountingPause::new(10),
        );

        sim.start().unwrap();
        let record = sim.run_one_attempt().unwrap().unwrap();
        assert!(record.success);
        let summary = sim.shutdown().unwrap();
        assert_eq!(summary.total, 1);

        let lines = &sim.sink().lines;
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("SMS attempt #1 - Success: true"));
        assert!(lines[2].ends_with(
            "Shutting down. Total Attempts: 1, Successful: 1, Failed: 0, Final Success Rate: 100.00%"
        ));
    }

    #[test]
    fn test_summary_logged_before_console() {
        let mut sim = Simulator::new(
            SimConfig::new("Testland", "TestCo"),
            ScriptedRng::new(&[]),
            MemorySink::new(),
            ClosedConsole,
            CountingPause::new(0),
        );
        assert!(sim.shutdown().is_ok());
        assert_eq!(sim.sink().lines.len(), 1);
    }

    #[test]
    fn test_unwritable_sink_aborts_attempt() {
        let mut sim = Simulator::new(
            SimConfig::new("Testland", "TestCo"),
            ScriptedRng::new(&[0.1, 0.5, 0.2]),
            FullSink {
                capacity: 0,
                lines: Vec::new(),
            },
            Vec::new(),
            CountingPause::new(10),
        );

        let err = sim.run_one_attempt().unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
        assert!(sim.console().is_empty());
    }

    #[test]
    fn test_unwritable_sink_stops_run_forever() {
        // First attempt is logged, the second append fails
        let draws = [0.1, 0.5, 0.2, 0.5, 0.4, 0.5, 0.9];
        let mut sim = Simulator::new(
            SimConfig::new("Testland", "TestCo"),
            ScriptedRng::new(&draws),
            FullSink {
                capacity: 1,
                lines: Vec::new(),
            },
            Vec::new(),
            CountingPause::new(100),
        );

        let err = sim.run_forever().unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
        assert_eq!(sim.state().total_attempts(), 2);
        assert_eq!(sim.sink().lines.len(), 1);
        // delay, interval, delay: no pause after the failed append
        assert_eq!(sim.pause.pauses.len(), 3);
    }
}
