//! Continuous execution loop for one job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::job::{JobSpec, JobState, JobStatus, truncate_error};
use crate::runner::JobRunner;

/// Stop-flag polling granularity inside the interval sleep.
///
/// A stop request takes effect within roughly one tick rather than
/// only at the end of the full interval.
const STOP_POLL_TICK: Duration = Duration::from_secs(1);

/// Owns the continuous execution loop for one job.
///
/// Each iteration executes the job's command through [`JobRunner`],
/// stores the next scheduled run time, then sleeps for the interval in
/// one-second ticks, re-checking the stop flag every tick. A single
/// in-flight command cannot be interrupted mid-flight; it runs to
/// completion or its own timeout before the stop is observed.
pub struct JobWorker {
    spec: JobSpec,
    state: Arc<Mutex<JobState>>,
    runner: Arc<JobRunner>,
    stop: Arc<AtomicBool>,
}

impl JobWorker {
    /// Create a worker bound to one job's spec, state and stop flag.
    pub fn new(
        spec: JobSpec,
        state: Arc<Mutex<JobState>>,
        runner: Arc<JobRunner>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            spec,
            state,
            runner,
            stop,
        }
    }

    /// Run the loop until the stop flag is observed or the loop crashes.
    ///
    /// A panic escaping the runner is caught: the job moves to Error
    /// with the panic text as `last_error` and the worker exits without
    /// retrying. An explicit start is required to resume. The final
    /// transition to Stopped on a clean stop belongs to the controller.
    pub async fn run(self) {
        debug!("Worker for job '{}' started", self.spec.id);

        loop {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let attempt = std::panic::AssertUnwindSafe(
                self.runner.execute(&self.spec, &self.state),
            )
            .catch_unwind()
            .await;

            if let Err(panic) = attempt {
                let text = panic_text(panic);
                error!("Worker for job '{}' crashed: {}", self.spec.id, text);

                let mut state = self.state.lock();
                state.status = JobStatus::Error;
                state.last_error = Some(truncate_error(&text));
                state.next_run_at = None;
                state.worker = None;
                return;
            }

            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            self.state.lock().next_run_at = Some(
                Utc::now()
                    + chrono::Duration::from_std(self.spec.interval())
                        .unwrap_or_else(|_| chrono::Duration::seconds(1)),
            );

            for _ in 0..self.spec.interval_secs {
                if self.stop.load(Ordering::SeqCst) {
                    debug!("Worker for job '{}' observed stop", self.spec.id);
                    return;
                }
                sleep(STOP_POLL_TICK).await;
            }
        }

        debug!("Worker for job '{}' stopped", self.spec.id);
    }
}

/// Extract a readable message from a panic payload.
fn panic_text(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
