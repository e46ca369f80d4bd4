use std::{
    io,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use tokio::{process::Command, time::Instant};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Failed to spawn {shell:?} -c '{command}': {source}")]
    Spawn {
        shell: PathBuf,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Exited with code {code}: {command}")]
    ExitCode { command: String, code: i32 },

    #[error("Terminated by signal: {command}")]
    Signaled { command: String },

    #[error("Time limit exceeded ({limit:?}): {command}")]
    TimeLimitExceeded { command: String, limit: Duration },

    #[error("Failed to communicate with subprocess '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub time: Option<Duration>,
    /// In MiB.
    pub memory: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs command lines through a shell.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: PathBuf,
    work_dir: Option<PathBuf>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    pub const DEFAULT_SHELL: &str = "/bin/sh";

    pub fn new() -> Self {
        Self {
            shell: Self::DEFAULT_SHELL.into(),
            work_dir: None,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// `<shell> -c <cmd>`, with the memory limit applied through `ulimit -v`.
    /// The child is killed when the returned command's child handle is dropped.
    pub fn command(&self, cmd: &str, memory_limit_mib: Option<u64>) -> Command {
        let line = match memory_limit_mib {
            Some(mib) => format!("ulimit -v {}; {}", mib.saturating_mul(1024), cmd),
            None => cmd.to_owned(),
        };
        let mut c = Command::new(&self.shell);
        c.args(["-c", &line]).kill_on_drop(true);
        if let Some(dir) = &self.work_dir {
            c.current_dir(dir);
        }
        c
    }

    pub(crate) fn spawn_error(&self, cmd: &str, source: io::Error) -> ExecError {
        ExecError::Spawn {
            shell: self.shell.clone(),
            command: cmd.to_owned(),
            source,
        }
    }

    /// Runs `cmd` to completion and captures its output.
    /// A non-zero exit is not an error here; see [`Self::run_checked`].
    pub async fn run(&self, cmd: &str, limits: Limits) -> Result<CommandOutput> {
        let child = self
            .command(cmd, limits.memory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(cmd, e))?;

        let start_at = Instant::now();
        let fut = child.wait_with_output();
        let res = match limits.time {
            // dropping `fut` on timeout kills the child (kill_on_drop)
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                ExecError::TimeLimitExceeded {
                    command: cmd.to_owned(),
                    limit,
                }
            })?,
            None => fut.await,
        };
        let elapsed = start_at.elapsed();

        let output = res.map_err(|e| ExecError::Io {
            command: cmd.to_owned(),
            source: e,
        })?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into(),
            stderr: String::from_utf8_lossy(&output.stderr).into(),
            elapsed,
        })
    }

    /// Like [`Self::run`], but a non-zero exit is an error.
    /// Output is logged at debug level either way.
    pub async fn run_checked(&self, cmd: &str, limits: Limits) -> Result<CommandOutput> {
        log::debug!("$ {}", cmd);
        let output = self.run(cmd, limits).await?;
        log_output(&output);
        match output.status {
            Some(0) => Ok(output),
            Some(code) => Err(ExecError::ExitCode {
                command: cmd.to_owned(),
                code,
            }),
            None => Err(ExecError::Signaled {
                command: cmd.to_owned(),
            }),
        }
    }
}

fn log_output(output: &CommandOutput) {
    if !output.stdout.is_empty() {
        log::debug!("[stdout]\n{}", output.stdout.trim_end());
    }
    if !output.stderr.is_empty() {
        log::debug!("[stderr]\n{}", output.stderr.trim_end());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn should_capture_output() {
        let out = CommandRunner::new()
            .run("echo hello; echo oops >&2; exit 3", Limits::default())
            .await
            .unwrap();
        assert_eq!(out.status, Some(3));
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
        assert!(!out.success());
    }

    #[tokio::test]
    async fn run_checked_should_fail_on_nonzero_exit() {
        let err = CommandRunner::new()
            .run_checked("exit 42", Limits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::ExitCode { code: 42, .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn should_be_killed_on_time_limit() {
        let limits = Limits {
            time: Some(Duration::from_millis(200)),
            memory: None,
        };
        let start = std::time::Instant::now();
        let err = CommandRunner::new()
            .run("sleep 5", limits)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::TimeLimitExceeded { .. }), "{:?}", err);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let err = CommandRunner::new()
            .shell("/nonexistent/shell")
            .run("true", Limits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn should_run_in_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fsutil::write(tmp.path().join("marker.txt"), "found").unwrap();
        let out = CommandRunner::new()
            .work_dir(tmp.path())
            .run_checked("cat marker.txt", Limits::default())
            .await
            .unwrap();
        assert_eq!(out.stdout, "found");
    }

    #[test]
    fn huge_memory_limit_saturates() {
        let c = CommandRunner::new().command("true", Some(u64::MAX));
        let args: Vec<_> = c.as_std().get_args().collect();
        assert_eq!(args[0], "-c");
        assert_eq!(args[1], format!("ulimit -v {}; true", u64::MAX).as_str());
    }
}
