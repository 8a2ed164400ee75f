//! Job specification and runtime state.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Maximum length of a recorded `last_error` message.
pub const MAX_ERROR_LEN: usize = 200;

/// Job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job has no active worker.
    Stopped,
    /// Job has an active worker executing on its interval.
    Running,
    /// Job's worker crashed; an explicit start is required to resume.
    Error,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Stopped
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Stopped => write!(f, "stopped"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

/// Opaque external command invocation descriptor.
///
/// The controller never interprets the command beyond launching it and
/// truncating its stderr for `last_error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to invoke.
    pub program: String,
    /// Arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command descriptor.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Immutable job specification, created at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Unique job id.
    pub id: String,
    /// Human-readable label.
    pub display_name: String,
    /// External command to invoke per run.
    pub command: CommandSpec,
    /// Seconds between automatic runs.
    pub interval_secs: u64,
}

impl JobSpec {
    /// Create a new job specification.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        command: CommandSpec,
        interval_secs: u64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            command,
            interval_secs,
        }
    }

    /// Get the run interval as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Handle to a job's active worker task.
///
/// Present in [`JobState`] if and only if the job is Running.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    /// Cooperative stop flag, checked by the worker every tick.
    pub(crate) stop: Arc<AtomicBool>,
    /// Join handle for the worker task.
    pub(crate) join: JoinHandle<()>,
}

/// Mutable per-job state, one instance per registered job.
///
/// Guarded by a per-job mutex; every mutation path (worker loop,
/// run-once, start/stop) goes through that lock so `status()` never
/// observes a torn update.
#[derive(Debug, Default)]
pub struct JobState {
    /// Current status.
    pub status: JobStatus,
    /// Start time of the most recent execution attempt.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Next automatic run, cleared when stopped.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Successful executions since process start.
    pub success_count: u64,
    /// Failed executions since process start.
    pub error_count: u64,
    /// Truncated error text from the last attempt, cleared on success.
    pub last_error: Option<String>,
    /// Active worker, present iff status is Running.
    pub(crate) worker: Option<WorkerHandle>,
}

impl JobState {
    /// Record the start of an execution attempt.
    pub fn record_start(&mut self, at: DateTime<Utc>) {
        self.last_run_at = Some(at);
    }

    /// Record a successful execution.
    pub fn record_success(&mut self) {
        self.success_count += 1;
        self.last_error = None;
    }

    /// Record a failed execution with a pre-truncated error message.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.error_count += 1;
        self.last_error = Some(truncate_error(&error.into()));
    }

    /// Build a point-in-time snapshot for the given spec.
    pub fn snapshot(&self, spec: &JobSpec) -> JobSnapshot {
        JobSnapshot {
            task_name: spec.id.clone(),
            display_name: spec.display_name.clone(),
            status: self.status,
            last_run: self.last_run_at,
            next_run: self.next_run_at,
            success_count: self.success_count,
            error_count: self.error_count,
            last_error: self.last_error.clone(),
            interval_secs: spec.interval_secs,
        }
    }
}

/// Point-in-time view of one job, as reported by `status()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Job id.
    pub task_name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Status at snapshot time.
    pub status: JobStatus,
    /// Start of the most recent execution attempt.
    pub last_run: Option<DateTime<Utc>>,
    /// Next scheduled automatic run.
    pub next_run: Option<DateTime<Utc>>,
    /// Successful executions since process start.
    pub success_count: u64,
    /// Failed executions since process start.
    pub error_count: u64,
    /// Truncated error text from the last attempt.
    pub last_error: Option<String>,
    /// Seconds between automatic runs.
    pub interval_secs: u64,
}

/// Truncate an error message to [`MAX_ERROR_LEN`] characters.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_LEN).collect()
}
