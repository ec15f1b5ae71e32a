use std::path::Path;
use std::time::{Duration, Instant};

use crate::debug::DebugLog;

use super::process::{Captured, InvokeError, Invocation};

/// Repeated runs of one executable.
#[derive(Debug)]
pub struct Execution {
    /// The final run; the only one compared against the fixture.
    pub last: Captured,
    pub elapsed: Duration,
    pub repeats: u32,
}

impl Execution {
    /// Mean wall time per run.
    pub fn average(&self) -> Duration {
        self.elapsed / self.repeats.max(1)
    }
}

/// Run `exe` `repeats` times (at least once), each under `timeout`, feeding
/// `input` on stdin. Stops at the first run that fails to complete.
pub async fn execute(
    exe: &Path,
    cwd: &Path,
    input: &[u8],
    repeats: u32,
    timeout: Duration,
    log: &DebugLog,
) -> Result<Execution, InvokeError> {
    let repeats = repeats.max(1);
    let run = || {
        Invocation::new(exe, timeout)
            .input(input)
            .current_dir(cwd)
            .run(log)
    };

    let start = Instant::now();
    let mut last = run().await?;
    for _ in 1..repeats {
        last = run().await?;
    }
    let elapsed = start.elapsed();

    Ok(Execution {
        last,
        elapsed,
        repeats,
    })
}
