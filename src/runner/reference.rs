use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{Config, split_flags};
use crate::debug::DebugLog;
use crate::models::TestCase;

use super::process::Invocation;
use super::{BuildError, Toolchain, run_stage};

const STAGE: &str = "compile";

/// Baseline mode: a trusted C compiler builds the case source directly, so
/// timings show what a mature compiler achieves. Output is not compared.
pub struct ReferenceToolchain {
    compiler: String,
    flags: Vec<String>,
    runtime: PathBuf,
    work_dir: PathBuf,
    exe: PathBuf,
    timeout: Duration,
    name: String,
    log: DebugLog,
}

impl ReferenceToolchain {
    pub fn new(config: &Config, log: DebugLog) -> Result<Self> {
        let compiler = config.toolchain.reference.clone();
        let name = Path::new(&compiler)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| compiler.clone());
        Ok(Self {
            flags: split_flags(&config.toolchain.reference_flags)?,
            runtime: config.paths.runtime.clone(),
            work_dir: config.paths.work_dir.clone(),
            exe: config.executable_path(),
            timeout: config.limits.compile_timeout(),
            compiler,
            name,
            log,
        })
    }

    /// Copy the case source to a temp file with a `.c` suffix, leaving the
    /// case directory untouched.
    fn write_c_source(&self, case: &TestCase) -> Result<tempfile::NamedTempFile> {
        let source = std::fs::read(&case.source)
            .with_context(|| format!("failed to read {}", case.source.display()))?;
        let mut file = tempfile::Builder::new()
            .prefix(&format!("compbench-{}-", case.name))
            .suffix(".c")
            .tempfile()
            .context("failed to create temp C source")?;
        file.write_all(&source)
            .context("failed to write temp C source")?;
        Ok(file)
    }
}

#[async_trait]
impl Toolchain for ReferenceToolchain {
    async fn build(&self, case: &TestCase) -> Result<(), BuildError> {
        let _ = tokio::fs::remove_file(&self.exe).await;

        let c_source = self.write_c_source(case).map_err(|e| BuildError::Failed {
            stage: STAGE,
            detail: format!("{:#}", e),
        })?;

        let compile = Invocation::new(&self.compiler, self.timeout)
            .args(&self.flags)
            .arg(c_source.path())
            .arg(&self.runtime)
            .arg("-o")
            .arg(&self.exe)
            .current_dir(&self.work_dir);
        let result = run_stage(STAGE, compile, &self.log).await;

        // Keep the temp file alive until the compiler exits
        drop(c_source);
        result
    }

    fn trusts_output(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
