use std::path::{Path, PathBuf};

/// One test program and its fixtures, keyed by the shared base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub source: PathBuf,
    /// `<name>.in`, fed to stdin when present.
    pub input: Option<PathBuf>,
    /// `<name>.out`, required; a missing file surfaces when the case is compared.
    pub expected: PathBuf,
}

impl TestCase {
    /// Build a case from its source path, picking up sibling fixtures.
    pub fn from_source(source: PathBuf) -> Option<Self> {
        let stem = source.file_stem()?;
        let dir = source.parent().unwrap_or(Path::new("."));
        // Fixture names come from the raw stem so non-UTF-8 names still pair up.
        let fixture = |ext: &str| {
            let mut name = stem.to_os_string();
            name.push(ext);
            dir.join(name)
        };
        let input = fixture(".in");
        let expected = fixture(".out");
        let name = stem.to_string_lossy().into_owned();
        Some(Self {
            input: input.is_file().then_some(input),
            expected,
            name,
            source,
        })
    }

    /// File name of the source as listed in the report.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}
