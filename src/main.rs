mod budget;
mod cli;
mod compare;
mod config;
mod debug;
mod discovery;
mod harness;
mod models;
mod report;
mod runner;
#[cfg(test)]
mod testutil;
mod theme;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use budget::TimeBudget;
use cli::Args;
use config::Config;
use debug::DebugLog;
use harness::Harness;
use models::RunReport;
use report::Reporter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let run_start = Instant::now();
    let args = Args::parse();

    let root = match args.root {
        Some(ref root) => root.clone(),
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let mut config = Config::load(&root)?;
    args.apply(&mut config);
    let config = config.rooted(&root);

    let log = DebugLog::from_env();
    let toolchain = runner::detect(&config, args.clang, log.clone())?;

    // Opened before discovery so a fatal listing error still flushes and closes it.
    let mut reporter = Reporter::open(&config.paths.report, config.report.console)?;
    let cases = discovery::discover(&config.paths.cases, &config.discovery)?;

    let budget = TimeBudget::new(run_start, config.limits.budget());
    let harness = Harness::new(&config, toolchain.as_ref(), log);
    let report = harness.evaluate(&cases, &budget, &mut reporter).await?;

    if let Some(ref path) = args.json {
        write_summary(&report, path)?;
    }
    Ok(())
}

fn write_summary(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.summary())?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
