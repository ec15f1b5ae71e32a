pub mod compiler;
pub mod execute;
pub mod process;
pub mod reference;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::debug::DebugLog;
use crate::models::{Outcome, TestCase};

use process::{InvokeError, Invocation};

/// Why a case never produced an executable. `stage` names the failing step
/// the way the report prints it (`compile-1`, `compile-2`, `compile`).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{stage} timeout")]
    Timeout { stage: &'static str },
    #[error("{stage} failed: {detail}")]
    Failed { stage: &'static str, detail: String },
}

impl BuildError {
    pub fn into_outcome(self) -> Outcome {
        match self {
            BuildError::Timeout { stage } => Outcome::CompileTimeout {
                stage: stage.into(),
            },
            BuildError::Failed { stage, detail } => Outcome::CompileFailure {
                stage: stage.into(),
                detail,
            },
        }
    }
}

/// Turns a case's source into the shared executable.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Build `case` into the configured executable path.
    async fn build(&self, case: &TestCase) -> Result<(), BuildError>;

    /// When true, executions pass without comparing against the fixture.
    fn trusts_output(&self) -> bool;

    /// Column header for this toolchain's timings in the report.
    fn name(&self) -> &str;
}

/// Construct the toolchain for this run: the compiler under test, or the
/// reference compiler when `reference` is set.
pub fn detect(config: &Config, reference: bool, log: DebugLog) -> Result<Arc<dyn Toolchain>> {
    Ok(if reference {
        Arc::new(reference::ReferenceToolchain::new(config, log)?)
    } else {
        Arc::new(compiler::CompilerToolchain::new(config, log)?)
    })
}

/// Run one build step; a non-zero exit counts as a failure with stderr as detail.
pub(crate) async fn run_stage(
    stage: &'static str,
    invocation: Invocation,
    log: &DebugLog,
) -> Result<(), BuildError> {
    match invocation.run(log).await {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => Err(BuildError::Failed {
            stage,
            detail: format!("exit code {}\n{}", out.exit_code(), out.stderr_text()),
        }),
        Err(InvokeError::TimedOut(_)) => Err(BuildError::Timeout { stage }),
        Err(e) => Err(BuildError::Failed {
            stage,
            detail: e.to_string(),
        }),
    }
}
