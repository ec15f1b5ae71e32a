use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Compile, run and time every test case against the compiler under test.
#[derive(Debug, Parser)]
#[command(name = "compbench", version)]
pub struct Args {
    /// Echo the report to the console as well as the report file.
    #[arg(long)]
    pub console: bool,

    /// Build cases with the reference C compiler instead, to estimate achievable runtime.
    #[arg(long)]
    pub clang: bool,

    /// Base directory for relative paths and `compbench.toml` [default: current directory].
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Case directory, overriding the config (relative to the root).
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Report file, overriding the config (relative to the root).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also write a JSON summary of the run to this file.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl Args {
    /// Layer command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if self.console {
            config.report.console = true;
        }
        if let Some(ref cases) = self.cases {
            config.paths.cases = cases.clone();
        }
        if let Some(ref report) = self.report {
            config.paths.report = report.clone();
        }
    }
}
