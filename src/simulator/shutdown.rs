//! Interrupt handling and interruptible pauses.
//!
//! SIGINT/SIGTERM only flip an atomic flag; the simulator loop notices it
//! between poll slices of its sleeps and runs the shutdown path itself, so
//! counters are never touched from signal context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Sleeps used by the simulator loop.
pub trait Pause {
    /// Wait for `duration`. Returns `false` if a stop was requested before
    /// the full duration elapsed.
    fn pause(&mut self, duration: Duration) -> bool;

    /// Whether a stop has been requested.
    fn is_stopped(&self) -> bool;
}

/// Shutdown flag set by OS signals or by hand.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl ShutdownSignal {
    /// A flag not wired to any signal.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            poll_interval,
        }
    }

    /// A flag set by SIGINT or SIGTERM.
    ///
    /// A second signal while the flag is already set terminates the process
    /// right away with exit status 1.
    pub fn install(poll_interval: Duration) -> Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        use signal_hook::flag;

        let signal = Self::new(poll_interval);
        for sig in [SIGINT, SIGTERM] {
            // Order matters: the conditional shutdown must see the flag
            // before the first signal sets it.
            flag::register_conditional_shutdown(sig, 1, Arc::clone(&signal.flag))
                .map_err(Error::Signal)?;
            flag::register(sig, Arc::clone(&signal.flag)).map_err(Error::Signal)?;
        }
        info!("Signal handlers installed");
        Ok(signal)
    }

    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Pause for ShutdownSignal {
    fn pause(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_shutdown() {
                debug!("Pause interrupted by shutdown request");
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(self.poll_interval.min(deadline - now));
        }
    }

    fn is_stopped(&self) -> bool {
        self.is_shutdown()
    }
}
