//! Automation controller errors.

use thiserror::Error;

/// Errors surfaced by controller operations.
///
/// Failures local to one job's execution (command failure, timeout,
/// worker crash) are never reported here; they land in that job's
/// counters and `last_error`. Only structural errors propagate.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Caller referenced a job id that is not in the registry.
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
