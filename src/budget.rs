use std::time::{Duration, Instant};

/// Wall-clock ceiling shared by every case of a run.
///
/// Holds both the process start and the start of the current batch; the
/// budget is exceeded once either has run past the ceiling. Backed by a
/// monotonic clock, so an exceeded budget stays exceeded.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    run_start: Instant,
    batch_start: Instant,
    ceiling: Duration,
}

impl TimeBudget {
    pub fn new(run_start: Instant, ceiling: Duration) -> Self {
        Self {
            run_start,
            batch_start: Instant::now(),
            ceiling,
        }
    }

    /// Time since the current batch of cases started.
    pub fn elapsed(&self) -> Duration {
        self.batch_start.elapsed()
    }

    /// Time since the process started.
    pub fn elapsed_total(&self) -> Duration {
        self.run_start.elapsed()
    }

    pub fn exceeded(&self) -> bool {
        self.elapsed() > self.ceiling || self.elapsed_total() > self.ceiling
    }
}
