use anyhow::Result;

use crate::budget::TimeBudget;
use crate::compare;
use crate::config::Config;
use crate::debug::DebugLog;
use crate::models::{Outcome, RunReport, RunResult, TestCase};
use crate::report::Reporter;
use crate::runner::Toolchain;
use crate::runner::execute::execute;
use crate::runner::process::InvokeError;

/// Drives every case through build, execution and comparison, one at a time.
pub struct Harness<'a> {
    config: &'a Config,
    toolchain: &'a dyn Toolchain,
    log: DebugLog,
}

impl<'a> Harness<'a> {
    pub fn new(config: &'a Config, toolchain: &'a dyn Toolchain, log: DebugLog) -> Self {
        Self {
            config,
            toolchain,
            log,
        }
    }

    /// Run all `cases` in order and write the report. Once `budget` is
    /// exceeded the remaining cases are recorded as skipped without building.
    pub async fn evaluate(
        &self,
        cases: &[TestCase],
        budget: &TimeBudget,
        reporter: &mut Reporter,
    ) -> Result<RunReport> {
        let total = cases.len();
        let mut report = RunReport::new(total);

        for (index, case) in cases.iter().enumerate() {
            let prefix = reporter.case_started(index, total, case)?;
            let result = if budget.exceeded() {
                self.log.write(&format!(
                    "[budget] skipping {} after {:?}",
                    case.name,
                    budget.elapsed_total()
                ));
                RunResult::skipped(&case.name)
            } else {
                self.run_case(case).await
            };
            let rest = reporter.case_finished(&result)?;
            report.record(index, result, prefix + &rest);
        }

        reporter.finish(&report, cases, self.toolchain.name())?;
        Ok(report)
    }

    /// Build, run and judge a single case. Every failure is folded into the
    /// returned result.
    pub async fn run_case(&self, case: &TestCase) -> RunResult {
        if let Err(e) = self.toolchain.build(case).await {
            return RunResult::failed(&case.name, e.into_outcome());
        }

        let input = match &case.input {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return RunResult::failed(
                        &case.name,
                        Outcome::ExecutionError {
                            detail: format!("failed to read {}: {}", path.display(), e),
                        },
                    );
                }
            },
            None => Vec::new(),
        };

        let limits = &self.config.limits;
        let execution = match execute(
            &self.config.executable_path(),
            &self.config.paths.work_dir,
            &input,
            limits.repeats,
            limits.run_timeout(),
            &self.log,
        )
        .await
        {
            Ok(execution) => execution,
            Err(InvokeError::TimedOut(_)) => {
                return RunResult::failed(&case.name, Outcome::ExecutionTimeout);
            }
            Err(e) => {
                return RunResult::failed(
                    &case.name,
                    Outcome::ExecutionError {
                        detail: e.to_string(),
                    },
                );
            }
        };

        if self.toolchain.trusts_output() {
            return RunResult::pass(&case.name, execution.average());
        }

        let expected = match tokio::fs::read_to_string(&case.expected).await {
            Ok(text) => text,
            Err(e) => {
                return RunResult::failed(
                    &case.name,
                    Outcome::FixtureError {
                        detail: format!("{}: {}", case.expected.display(), e),
                    },
                );
            }
        };

        match compare::compare(&expected, &execution.last.stdout, execution.last.exit_code()) {
            Outcome::Pass => RunResult::pass(&case.name, execution.average()),
            outcome => RunResult::failed(&case.name, outcome),
        }
    }
}
