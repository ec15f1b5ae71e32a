use std::path::Path;

use anyhow::{Context, Result};

use crate::config::DiscoveryConfig;
use crate::models::TestCase;

/// List the cases in `dir`: regular files ending in `.<extension>` that no
/// ignore pattern matches.
pub fn discover(dir: &Path, config: &DiscoveryConfig) -> Result<Vec<TestCase>> {
    let ignore = config
        .ignore
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("bad ignore pattern `{}`", p)))
        .collect::<Result<Vec<_>>>()?;
    let suffix = format!(".{}", config.extension);

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read case directory {}", dir.display()))?;

    let mut cases = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if !file_name.ends_with(&suffix) || ignore.iter().any(|p| p.matches(&file_name)) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(case) = TestCase::from_source(path) {
            cases.push(case);
        }
    }

    if config.sort {
        cases.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn filters_by_extension_and_pairs_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.cminus");
        touch(dir.path(), "b.out");
        touch(dir.path(), "b.in");
        touch(dir.path(), "a.cminus");
        touch(dir.path(), "a.out");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "a.c");
        std::fs::create_dir(dir.path().join("sub.cminus")).unwrap();

        let cases = discover(dir.path(), &DiscoveryConfig::default()).unwrap();
        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(cases[0].input, None);
        assert_eq!(cases[0].expected, dir.path().join("a.out"));
        assert_eq!(cases[1].input, Some(dir.path().join("b.in")));
        assert_eq!(cases[1].file_name(), "b.cminus");
    }

    #[test]
    fn ignore_patterns_drop_cases() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "fast.cminus");
        touch(dir.path(), "huge_matrix.cminus");
        let config = DiscoveryConfig {
            ignore: vec!["huge_*".into()],
            ..DiscoveryConfig::default()
        };
        let cases = discover(dir.path(), &config).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "fast");
    }

    #[test]
    fn custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "x.sy");
        touch(dir.path(), "y.cminus");
        let config = DiscoveryConfig {
            extension: "sy".into(),
            ..DiscoveryConfig::default()
        };
        let cases = discover(dir.path(), &config).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "x");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(OsStr::from_bytes(b"caf\xe9.cminus"));
        let input = dir.path().join(OsStr::from_bytes(b"caf\xe9.in"));
        std::fs::write(&source, "").unwrap();
        std::fs::write(&input, "").unwrap();

        let cases = discover(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].source, source);
        assert_eq!(cases[0].input, Some(input));
        assert_eq!(cases[0].name, "caf\u{FFFD}");
        assert_eq!(
            cases[0].expected,
            dir.path().join(OsStr::from_bytes(b"caf\xe9.out"))
        );
    }

    #[test]
    fn unreadable_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover(&missing, &DiscoveryConfig::default()).unwrap_err();
        assert!(err.to_string().contains("failed to read case directory"));
    }
}
