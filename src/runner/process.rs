use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

use crate::debug::DebugLog;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a finished process left behind.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    /// Exit code, or the negated signal number if the process was killed.
    pub fn exit_code(&self) -> i32 {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = self.status.signal() {
                return -signal;
            }
        }
        self.status.code().unwrap_or(-1)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Guard that kills the child process (and its entire process group) on drop.
struct ChildGuard {
    child: Child,
    /// Process group ID saved at spawn time so we can kill the whole group.
    #[cfg(unix)]
    pgid: Option<u32>,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        #[cfg(unix)]
        let pgid = child.id();
        Self {
            child,
            #[cfg(unix)]
            pgid,
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Kill the entire process group so anything the child forked goes too.
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            unsafe { libc::kill(-(pgid as libc::pid_t), libc::SIGKILL) };
        }
        let _ = self.child.start_kill();
    }
}

/// One external command run to completion under a wall-clock timeout.
pub struct Invocation {
    cmd: Command,
    program: String,
    input: Vec<u8>,
    timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>, timeout: Duration) -> Self {
        let program = program.as_ref();
        Self {
            cmd: Command::new(program),
            program: program.to_string_lossy().into_owned(),
            input: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    /// Bytes written to the child's stdin; stdin is closed right after.
    pub fn input(mut self, input: &[u8]) -> Self {
        self.input = input.to_vec();
        self
    }

    /// Spawn, feed stdin, capture stdout/stderr and wait. On timeout the child's
    /// process group is killed before returning.
    pub async fn run(self, log: &DebugLog) -> Result<Captured, InvokeError> {
        let Self {
            mut cmd,
            program,
            input,
            timeout,
        } = self;

        log.write(&format!("[cmd] {:?}", cmd.as_std()));

        // Own process group, so the guard can take out grandchildren as well.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        let child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: program.clone(),
                source,
            })?;
        let mut guard = ChildGuard::new(child);

        let stdin = guard.child.stdin.take();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                // The child may exit without reading; a broken pipe is not our concern.
                let _ = stdin.write_all(&input).await;
                let _ = stdin.shutdown().await;
            }
        });
        let stdout = tokio::spawn(read_all(guard.child.stdout.take()));
        let stderr = tokio::spawn(read_all(guard.child.stderr.take()));

        let status = match tokio::time::timeout(timeout, guard.child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => return Err(InvokeError::Wait { program, source }),
            Err(_) => {
                log.write(&format!("[timeout] {} after {:?}", program, timeout));
                return Err(InvokeError::TimedOut(timeout));
            }
        };
        // Leader is gone; reap any stragglers still holding the pipes.
        drop(guard);

        let _ = writer.await;
        let captured = Captured {
            status,
            stdout: stdout.await.unwrap_or_default(),
            stderr: stderr.await.unwrap_or_default(),
        };

        log.write(&format!("[status] {} {}", program, captured.exit_code()));
        for line in captured.stderr_text().lines() {
            log.write(&format!("[stderr] {}", line));
        }
        Ok(captured)
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}
