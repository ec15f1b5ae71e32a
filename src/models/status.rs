use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::theme;

/// Final classification of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Outcome {
    Pass,
    CompileFailure { stage: String, detail: String },
    CompileTimeout { stage: String },
    ExecutionTimeout,
    ExecutionError { detail: String },
    /// Captured stdout was not valid UTF-8.
    InvalidOutput,
    /// The expected-output fixture could not be read.
    FixtureError { detail: String },
    OutputMismatch { expected: String, actual: String },
    Skipped,
}

impl Outcome {
    /// Everything but a pass counts against the run, budget skips included.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Pass)
    }

    pub fn color(&self) -> Color {
        match self {
            Outcome::Pass => theme::GREEN,
            Outcome::Skipped => theme::OVERLAY0,
            Outcome::CompileTimeout { .. } | Outcome::ExecutionTimeout => theme::YELLOW,
            _ => theme::RED,
        }
    }

    /// First line of the report entry, after the `[i/n] name: ` prefix.
    pub fn headline(&self) -> String {
        match self {
            Outcome::Pass => "pass".into(),
            Outcome::CompileFailure { stage, .. } => {
                format!("{} failed with an unexpected error", stage)
            }
            Outcome::CompileTimeout { stage } => format!("{} timeout", stage),
            Outcome::ExecutionTimeout => "executable time limit exceeded".into(),
            Outcome::ExecutionError { .. } => "executable runtime error".into(),
            Outcome::InvalidOutput => "executable output illegal characters".into(),
            Outcome::FixtureError { .. } => "expected output unreadable".into(),
            Outcome::OutputMismatch { .. } => {
                "output is different from standard answer, this may be caused by wrong return code"
                    .into()
            }
            Outcome::Skipped => "skipped due to exceeded total time limit".into(),
        }
    }

    /// Diagnostic lines written under the headline.
    pub fn details(&self) -> Vec<String> {
        match self {
            Outcome::CompileFailure { detail, .. }
            | Outcome::ExecutionError { detail }
            | Outcome::FixtureError { detail } => detail
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Outcome::OutputMismatch { expected, actual } => {
                vec![format!("\t{}", expected), format!("\t{}", actual)]
            }
            _ => Vec::new(),
        }
    }
}
