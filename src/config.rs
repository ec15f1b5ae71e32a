use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "compbench.toml";

/// Intermediate assembly written by the compiler under test, reused by every case.
pub const ASM_FILE: &str = "a.s";
/// Linked executable, reused by every case.
pub const EXE_FILE: &str = "a.out";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Locations of cases, outputs and external tools. Relative paths are
/// resolved against the harness root.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub cases: PathBuf,
    pub report: PathBuf,
    /// Directory holding `a.s` / `a.out`; also the cwd of the executable.
    pub work_dir: PathBuf,
    pub compiler: PathBuf,
    /// Runtime support source or object linked into every executable.
    pub runtime: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cases: PathBuf::from("testcases"),
            report: PathBuf::from("test_result"),
            work_dir: PathBuf::from("."),
            compiler: PathBuf::from("../../build/cminusfc"),
            runtime: PathBuf::from("../../src/io/io.c"),
        }
    }
}

/// Commands for the build stage. Flag strings are split with shell quoting rules.
/// Example: `compiler_flags = "-mem2reg -O2"`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub compiler_flags: String,
    pub linker: String,
    pub linker_flags: String,
    pub reference: String,
    pub reference_flags: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler_flags: "-mem2reg".into(),
            linker: "gcc".into(),
            linker_flags: String::new(),
            reference: "clang".into(),
            reference_flags: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub compile_timeout_secs: u64,
    pub run_timeout_secs: u64,
    /// Wall-clock ceiling for the whole run; remaining cases are skipped past it.
    pub budget_secs: u64,
    /// Executions per case; the reported time is their mean.
    pub repeats: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            compile_timeout_secs: 300,
            run_timeout_secs: 100,
            budget_secs: 30 * 60,
            repeats: 10,
        }
    }
}

impl LimitsConfig {
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.compile_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }
}

/// Controls which files in the case directory become test cases.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Source extension without the leading dot.
    pub extension: String,
    /// Sort cases by file name. When false, directory listing order is kept.
    pub sort: bool,
    /// Glob patterns matched against case file names to skip.
    /// Example: ["*_slow.cminus", "wip-*"]
    pub ignore: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "cminus".into(),
            sort: true,
            ignore: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Echo the report to stdout as well as the report file.
    pub console: bool,
}

impl Config {
    /// Load `compbench.toml` from `root`, falling back to defaults only if it
    /// does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config {}", path.display()));
            }
        };
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Resolve every relative path against `root`.
    pub fn rooted(mut self, root: &Path) -> Self {
        let paths = &mut self.paths;
        for path in [
            &mut paths.cases,
            &mut paths.report,
            &mut paths.work_dir,
            &mut paths.compiler,
            &mut paths.runtime,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    pub fn asm_path(&self) -> PathBuf {
        self.paths.work_dir.join(ASM_FILE)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.paths.work_dir.join(EXE_FILE)
    }
}

/// Split a configured flag string into arguments.
pub fn split_flags(flags: &str) -> Result<Vec<String>> {
    shell_words::split(flags).with_context(|| format!("unbalanced quoting in flags `{}`", flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_reference_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.limits.compile_timeout(), Duration::from_secs(300));
        assert_eq!(config.limits.run_timeout(), Duration::from_secs(100));
        assert_eq!(config.limits.budget(), Duration::from_secs(1800));
        assert_eq!(config.limits.repeats, 10);
        assert_eq!(config.discovery.extension, "cminus");
        assert_eq!(config.toolchain.linker, "gcc");
        assert_eq!(config.toolchain.reference, "clang");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[limits]\nrepeats = 3\n\n[discovery]\nignore = [\"big*\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.limits.repeats, 3);
        assert_eq!(config.limits.run_timeout_secs, 100);
        assert_eq!(config.discovery.ignore, vec!["big*".to_string()]);
        assert!(config.discovery.sort);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[limits\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(CONFIG_FILE)).unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn rooted_keeps_absolute_paths() {
        let mut config = Config::default();
        config.paths.compiler = PathBuf::from("/opt/cminusfc");
        let config = config.rooted(Path::new("/bench"));
        assert_eq!(config.paths.compiler, PathBuf::from("/opt/cminusfc"));
        assert_eq!(config.paths.cases, PathBuf::from("/bench/testcases"));
        assert_eq!(config.executable_path(), PathBuf::from("/bench/./a.out"));
    }

    #[test]
    fn flags_honor_quotes() {
        assert_eq!(
            split_flags("-mem2reg -D 'A B'").unwrap(),
            vec!["-mem2reg", "-D", "A B"]
        );
        assert!(split_flags("").unwrap().is_empty());
    }
}
