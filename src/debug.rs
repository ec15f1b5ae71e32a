use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const DEBUG_ENV: &str = "COMPBENCH_DEBUG";

/// Debug trace of every external invocation, enabled by pointing
/// `COMPBENCH_DEBUG` at a file path. A disabled log drops everything.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    file: Option<Arc<Mutex<File>>>,
}

impl DebugLog {
    pub fn from_env() -> Self {
        let file = std::env::var(DEBUG_ENV).ok().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .ok()
                .map(|f| Arc::new(Mutex::new(f)))
        });
        Self { file }
    }

    pub fn write(&self, msg: &str) {
        if let Some(ref file) = self.file
            && let Ok(mut f) = file.lock()
        {
            let _ = writeln!(f, "{}", msg);
        }
    }
}

#[cfg(test)]
impl DebugLog {
    pub fn to_file(file: File) -> Self {
        Self {
            file: Some(Arc::new(Mutex::new(file))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_log_is_silent() {
        DebugLog::default().write("ignored");
    }

    #[test]
    fn lines_land_in_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let log = DebugLog::to_file(File::create(&path).unwrap());
        log.write("[cmd] gcc");
        log.clone().write("[status] 0");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[cmd] gcc\n[status] 0\n");
    }
}
