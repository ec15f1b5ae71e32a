use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::status::Outcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub outcome: Outcome,
    /// Mean execution time, present only on a pass.
    #[serde(rename = "time_secs", with = "secs")]
    pub time: Option<Duration>,
}

/// `Option<Duration>` as fractional seconds.
mod secs {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        time.map(|t| t.as_secs_f64()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(d)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

impl RunResult {
    pub fn pass(name: impl Into<String>, time: Duration) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Pass,
            time: Some(time),
        }
    }

    pub fn failed(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            time: None,
        }
    }

    pub fn skipped(name: impl Into<String>) -> Self {
        Self::failed(name, Outcome::Skipped)
    }
}

/// Aggregate over a whole run, filled in case by case.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Report text per case, exactly as written.
    pub lines: Vec<String>,
    pub results: Vec<RunResult>,
    pub failed_count: usize,
    pub succ_count: usize,
    pub skipped_count: usize,
    pub total_time: Duration,
    /// Indexed by case order; `None` means no timing.
    timings: Vec<Option<Duration>>,
}

impl RunReport {
    pub fn new(case_count: usize) -> Self {
        Self {
            timings: vec![None; case_count],
            ..Self::default()
        }
    }

    pub fn record(&mut self, index: usize, result: RunResult, line: String) {
        if result.outcome.is_failure() {
            self.failed_count += 1;
            if result.outcome == Outcome::Skipped {
                self.skipped_count += 1;
            }
        } else {
            let time = result.time.unwrap_or_default();
            self.succ_count += 1;
            self.total_time += time;
            if let Some(slot) = self.timings.get_mut(index) {
                *slot = Some(time);
            }
        }
        self.lines.push(line);
        self.results.push(result);
    }

    pub fn timing(&self, index: usize) -> Option<Duration> {
        self.timings.get(index).copied().flatten()
    }

    /// Mean time over passing cases; zero when nothing passed.
    pub fn average(&self) -> Duration {
        if self.succ_count == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.succ_count as u32
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.results.len(),
            passed: self.succ_count,
            failed: self.failed_count,
            skipped: self.skipped_count,
            total_secs: self.total_time.as_secs_f64(),
            average_secs: self.average().as_secs_f64(),
            cases: self.results.clone(),
            lines: self.lines.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_secs: f64,
    pub average_secs: f64,
    pub cases: Vec<RunResult>,
    /// Report text per case, as written to the report file.
    pub lines: Vec<String>,
}
