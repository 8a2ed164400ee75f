//! External command execution.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::job::CommandSpec;

/// Errors raised when a command cannot produce an exit status.
///
/// A command that runs and exits non-zero is not an error here; that is
/// reported through [`CommandOutput::success`].
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command exceeded the caller-supplied timeout.
    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    /// The command could not be launched (e.g. executable missing).
    #[error("Failed to launch command: {0}")]
    Launch(String),
}

/// Captured result of one command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited successfully.
    pub success: bool,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

/// Collaborator that runs a command out-of-process with a timeout.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command, bounded by `deadline`.
    async fn run(&self, command: &CommandSpec, deadline: Duration)
    -> Result<CommandOutput, ExecError>;
}

/// Executor backed by real OS processes.
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a new process executor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(
        &self,
        command: &CommandSpec,
        deadline: Duration,
    ) -> Result<CommandOutput, ExecError> {
        debug!("Executing command: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(deadline, cmd.output())
            .await
            .map_err(|_| ExecError::Timeout(deadline.as_secs()))?
            .map_err(|e| ExecError::Launch(e.to_string()))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
