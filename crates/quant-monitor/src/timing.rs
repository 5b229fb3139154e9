//! Wall-clock timing for long-running commands.

use std::time::{Duration, Instant};
use tracing::info;

/// Logs how long a labelled stage took when it is finished or dropped.
#[derive(Debug)]
pub struct RunTimer {
    label: String,
    started: Instant,
    reported: bool,
}

impl RunTimer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
            reported: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the elapsed time and return it.
    pub fn finish(mut self) -> Duration {
        self.report()
    }

    fn report(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.reported {
            self.reported = true;
            info!(stage = %self.label, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
        }
        elapsed
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        self.report();
    }
}
