use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize, style};

use crate::models::{RunReport, RunResult, TestCase};
use crate::theme;

const RULE: &str = "===================================================================";

/// Append-only report sink, optionally echoed to stdout.
///
/// Every write is flushed immediately so a crashed or interrupted run still
/// leaves a readable report; the file is flushed once more when dropped.
pub struct Reporter {
    file: File,
    console: bool,
    styled: bool,
}

impl Reporter {
    pub fn open(path: &Path, console: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open report file {}", path.display()))?;
        Ok(Self {
            file,
            console,
            styled: io::stdout().is_terminal(),
        })
    }

    pub fn write(&mut self, msg: &str) -> io::Result<()> {
        self.write_colored(msg, None)
    }

    fn write_colored(&mut self, msg: &str, color: Option<Color>) -> io::Result<()> {
        if self.console {
            let mut stdout = io::stdout().lock();
            match color {
                Some(color) if self.styled => write!(stdout, "{}", style(msg).with(color))?,
                _ => write!(stdout, "{}", msg)?,
            }
            stdout.flush()?;
        }
        self.file.write_all(msg.as_bytes())?;
        self.file.flush()
    }

    /// `[i/n] name: `, written before the case is built so progress is visible.
    pub fn case_started(
        &mut self,
        index: usize,
        total: usize,
        case: &TestCase,
    ) -> io::Result<String> {
        let prefix = format!("[{}/{}] {}: ", index + 1, total, case.file_name());
        self.write_colored(&prefix, Some(theme::SUBTEXT0))?;
        Ok(prefix)
    }

    /// Outcome text following the prefix. Returns what was written.
    pub fn case_finished(&mut self, result: &RunResult) -> io::Result<String> {
        let mut text = match result.time {
            Some(time) => format!(
                "{}, costs {:.6}s\n",
                result.outcome.headline(),
                time.as_secs_f64()
            ),
            None => format!("{}\n", result.outcome.headline()),
        };
        let color = result.outcome.color();
        self.write_colored(&text, Some(color))?;

        let details: String = result
            .outcome
            .details()
            .into_iter()
            .map(|line| format!("{}\n", line))
            .collect();
        self.write(&details)?;
        text.push_str(&details);
        Ok(text)
    }

    /// Totals, averages and the per-case timing table.
    pub fn finish(
        &mut self,
        report: &RunReport,
        cases: &[TestCase],
        column: &str,
    ) -> io::Result<()> {
        let color = if report.failed_count == 0 {
            theme::GREEN
        } else {
            theme::RED
        };
        self.write_colored(&format!("{} tests failed\n", report.failed_count), Some(color))?;
        self.write(&format!(
            "total time is {:.6}s\navg time is {:.6}s\n{} tests finishes in time limit\n",
            report.total_time.as_secs_f64(),
            report.average().as_secs_f64(),
            report.succ_count,
        ))?;
        if report.skipped_count > 0 {
            self.write_colored(
                &format!("{} tests skipped\n", report.skipped_count),
                Some(theme::OVERLAY0),
            )?;
        }

        self.write_colored(&format!("testcase\t\t\t{}\n", column), Some(theme::BLUE))?;
        for (index, case) in cases.iter().enumerate() {
            self.write(&table_row(&case.file_name(), report.timing(index)))?;
        }
        self.write(&format!("{}\n", RULE))
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

fn table_row(name: &str, time: Option<Duration>) -> String {
    match time {
        Some(time) => format!("{:<20}\t\t {:.6}\n", name, time.as_secs_f64()),
        None => format!("{:<20}\t\t  None  \n", name),
    }
}
