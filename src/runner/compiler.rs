use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, split_flags};
use crate::debug::DebugLog;
use crate::models::TestCase;

use super::process::Invocation;
use super::{BuildError, Toolchain, run_stage};

/// The compiler under test emits assembly, the host linker turns it into an
/// executable together with the runtime support file.
pub struct CompilerToolchain {
    compiler: PathBuf,
    compiler_flags: Vec<String>,
    linker: String,
    linker_flags: Vec<String>,
    runtime: PathBuf,
    work_dir: PathBuf,
    asm: PathBuf,
    exe: PathBuf,
    timeout: Duration,
    name: String,
    log: DebugLog,
}

impl CompilerToolchain {
    pub fn new(config: &Config, log: DebugLog) -> Result<Self> {
        let compiler = config.paths.compiler.clone();
        let name = compiler
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "compiler".into());
        Ok(Self {
            compiler_flags: split_flags(&config.toolchain.compiler_flags)?,
            linker: config.toolchain.linker.clone(),
            linker_flags: split_flags(&config.toolchain.linker_flags)?,
            runtime: config.paths.runtime.clone(),
            work_dir: config.paths.work_dir.clone(),
            asm: config.asm_path(),
            exe: config.executable_path(),
            timeout: config.limits.compile_timeout(),
            compiler,
            name,
            log,
        })
    }
}

#[async_trait]
impl Toolchain for CompilerToolchain {
    async fn build(&self, case: &TestCase) -> Result<(), BuildError> {
        // Stale outputs from the previous case must never be mistaken for this one's.
        let _ = tokio::fs::remove_file(&self.asm).await;
        let _ = tokio::fs::remove_file(&self.exe).await;

        let compile = Invocation::new(&self.compiler, self.timeout)
            .args(&self.compiler_flags)
            .arg(&case.source)
            .arg("-S")
            .arg(&self.asm)
            .current_dir(&self.work_dir);
        run_stage("compile-1", compile, &self.log).await?;

        let link = Invocation::new(&self.linker, self.timeout)
            .args(&self.linker_flags)
            .arg(&self.asm)
            .arg(&self.runtime)
            .arg("-o")
            .arg(&self.exe)
            .current_dir(&self.work_dir);
        run_stage("compile-2", link, &self.log).await
    }

    fn trusts_output(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        &self.name
    }
}
