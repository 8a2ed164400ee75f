//! Single job invocation: execute the command, classify the outcome,
//! update the job's counters and timestamps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::executor::{CommandExecutor, ExecError};
use crate::job::{JobSpec, JobState, truncate_error};

/// Classification of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed with a success indication.
    Success,
    /// Command completed with a failure indication.
    CommandFailed,
    /// Command exceeded the timeout.
    TimedOut,
    /// Command could not be launched.
    LaunchFailed,
}

impl Outcome {
    /// Whether the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Executes one invocation of a job's command and records the result.
pub struct JobRunner {
    executor: Arc<dyn CommandExecutor>,
    command_timeout: Duration,
}

impl JobRunner {
    /// Create a new runner with the given command timeout.
    pub fn new(executor: Arc<dyn CommandExecutor>, command_timeout: Duration) -> Self {
        Self {
            executor,
            command_timeout,
        }
    }

    /// Execute one invocation of `spec` and record the result in `state`.
    ///
    /// `last_run_at` is set to the invocation start time before the
    /// command runs, regardless of outcome. All failure modes are
    /// captured in the returned [`Outcome`] and in the job's state;
    /// this call never fails and never modifies `status`.
    pub async fn execute(&self, spec: &JobSpec, state: &Mutex<JobState>) -> Outcome {
        info!("Running job '{}' ({})", spec.id, spec.command);
        state.lock().record_start(Utc::now());

        let result = self.executor.run(&spec.command, self.command_timeout).await;

        let mut state = state.lock();
        match result {
            Ok(output) if output.success => {
                state.record_success();
                info!("Job '{}' completed successfully", spec.id);
                Outcome::Success
            }
            Ok(output) => {
                let reason = if output.stderr.is_empty() {
                    "Unknown error".to_string()
                } else {
                    truncate_error(&output.stderr)
                };
                warn!("Job '{}' failed: {}", spec.id, reason);
                state.record_failure(reason);
                Outcome::CommandFailed
            }
            Err(err @ ExecError::Timeout(_)) => {
                warn!("Job '{}' {}", spec.id, err);
                state.record_failure(err.to_string());
                Outcome::TimedOut
            }
            Err(err @ ExecError::Launch(_)) => {
                warn!("Job '{}' could not be launched: {}", spec.id, err);
                state.record_failure(err.to_string());
                Outcome::LaunchFailed
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
