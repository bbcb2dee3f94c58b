//! Timeout bookkeeping
//!
//! Timeouts are absolute per operation: a monotonic start plus a budget. Every
//! sub-operation asks the timer for the rest of the budget instead of getting
//! a fresh one.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pluggable sleep used for busy backoff and for draining pending bytes.
///
/// The duration is an upper bound only; an implementation may wake early,
/// which is how a host cancels a transfer mid-flight.
pub type SleepFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// The default sleep function, backed by `std::thread::sleep`.
pub fn default_sleep_fn() -> SleepFn {
    Arc::new(|duration| std::thread::sleep(duration))
}

/// Measures elapsed time against a fixed budget.
#[derive(Debug, Clone, Copy)]
pub struct ElapsedTimer {
    start: Instant,
    timeout: Duration,
}

impl ElapsedTimer {
    /// Start a timer with the given budget.
    pub fn new(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    /// Time since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether the budget is spent.
    pub fn timed_out(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Remaining budget, saturating at zero.
    pub fn rest_of_timeout(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }
}
