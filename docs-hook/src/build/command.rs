//! Timed execution of external commands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Why an external command did not succeed.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command [{command}] failed to start: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command [{command}] failed with {status}")]
    Failed { command: String, status: ExitStatus },

    #[error("command [{command}] timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
}

impl CommandError {
    /// Display form of the command that failed.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. }
            | CommandError::Failed { command, .. }
            | CommandError::TimedOut { command, .. } => command,
        }
    }
}

/// A program invocation: argv plus optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cwd) = &self.cwd {
            write!(f, "cd {} && ", cwd.display())?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run `spec` to completion, killing it once `limit` elapses.
///
/// The child is only killed on timeout. Dropping the returned future leaves
/// the process running to completion in the background.
pub async fn run_command(spec: &CommandSpec, limit: Duration) -> Result<(), CommandError> {
    let command_line = spec.to_string();
    info!(command = %command_line, timeout_secs = limit.as_secs(), "command_starting");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let mut child = cmd.spawn().map_err(|source| {
        warn!(command = %command_line, error = %source, "command_spawn_failed");
        CommandError::Spawn {
            command: command_line.clone(),
            source,
        }
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout(limit, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(source)) => {
            warn!(command = %command_line, error = %source, "command_wait_failed");
            return Err(CommandError::Spawn {
                command: command_line,
                source,
            });
        }
        Err(_) => {
            warn!(command = %command_line, timeout_secs = limit.as_secs(), "command_timed_out");
            if let Err(e) = child.kill().await {
                warn!(command = %command_line, error = %e, "command_kill_failed");
            }
            return Err(CommandError::TimedOut {
                command: command_line,
                timeout: limit,
            });
        }
    };

    let stdout = stdout.await.unwrap_or_default();
    let stderr = stderr.await.unwrap_or_default();

    debug!(
        command = %command_line,
        stdout = %String::from_utf8_lossy(&stdout),
        stderr = %String::from_utf8_lossy(&stderr),
        "command_output"
    );

    if !status.success() {
        warn!(
            command = %command_line,
            status = %status,
            stderr = %String::from_utf8_lossy(&stderr),
            "command_failed"
        );
        return Err(CommandError::Failed {
            command: command_line,
            status,
        });
    }

    info!(command = %command_line, code = ?status.code(), "command_succeeded");
    Ok(())
}

/// Read a child pipe to the end on its own task so the child never blocks on
/// a full pipe, even after the caller has gone away.
fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                debug!(error = %e, "command_pipe_read_failed");
            }
        }
        buf
    })
}
