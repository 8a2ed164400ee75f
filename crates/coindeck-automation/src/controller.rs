//! The public-facing orchestrator: owns the job table, starts and stops
//! workers, exposes run-once, and aggregates the status snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::AutomationConfig;
use crate::error::AutomationError;
use crate::executor::CommandExecutor;
use crate::job::{JobSpec, JobState, JobStatus, WorkerHandle};
use crate::reporter::{StatsSource, StatusReporter};
use crate::runner::JobRunner;
use crate::status::AutomationStatus;
use crate::worker::JobWorker;

/// One registered job: immutable spec plus lock-guarded runtime state.
struct JobEntry {
    spec: JobSpec,
    state: Arc<Mutex<JobState>>,
}

/// Automation task controller.
///
/// Holds a fixed job table populated at construction. Each job's state
/// sits behind its own mutex; no global lock serializes unrelated jobs
/// against each other, and no lock is ever held across an await point.
pub struct Controller {
    jobs: Vec<JobEntry>,
    runner: Arc<JobRunner>,
    reporter: StatusReporter,
    stop_timeout: Duration,
    started_at: DateTime<Utc>,
}

impl Controller {
    /// Build a controller from config and its two collaborators.
    pub fn new(
        config: AutomationConfig,
        executor: Arc<dyn CommandExecutor>,
        stats: Arc<dyn StatsSource>,
    ) -> Self {
        let jobs = config
            .jobs
            .iter()
            .map(|spec| JobEntry {
                spec: spec.clone(),
                state: Arc::new(Mutex::new(JobState::default())),
            })
            .collect();

        Self {
            jobs,
            runner: Arc::new(JobRunner::new(executor, config.command_timeout())),
            reporter: StatusReporter::new(stats, config.stats_timeout()),
            stop_timeout: config.stop_timeout(),
            started_at: Utc::now(),
        }
    }

    /// Registered job ids, in registry order.
    pub fn job_ids(&self) -> Vec<&str> {
        self.jobs.iter().map(|e| e.spec.id.as_str()).collect()
    }

    fn entry(&self, job_id: &str) -> Result<&JobEntry, AutomationError> {
        self.jobs
            .iter()
            .find(|e| e.spec.id == job_id)
            .ok_or_else(|| AutomationError::UnknownJob(job_id.to_string()))
    }

    /// Start a job's continuous worker.
    ///
    /// Idempotent: starting an already-running job is a successful
    /// no-op and never spawns a second worker.
    pub async fn start(&self, job_id: &str) -> Result<(), AutomationError> {
        let entry = self.entry(job_id)?;

        let mut state = entry.state.lock();
        if state.status == JobStatus::Running {
            info!("Job '{}' is already running", job_id);
            return Ok(());
        }

        state.status = JobStatus::Running;
        state.next_run_at = Some(
            Utc::now()
                + chrono::Duration::from_std(entry.spec.interval())
                    .unwrap_or_else(|_| chrono::Duration::seconds(1)),
        );

        let stop = Arc::new(AtomicBool::new(false));
        let worker = JobWorker::new(
            entry.spec.clone(),
            entry.state.clone(),
            self.runner.clone(),
            stop.clone(),
        );
        let join = tokio::spawn(worker.run());
        state.worker = Some(WorkerHandle { stop, join });

        info!("Started job '{}' ({})", job_id, entry.spec.display_name);
        Ok(())
    }

    /// Stop a job's continuous worker.
    ///
    /// Signals the worker, then waits a bounded time for it to exit.
    /// Best-effort: when the wait elapses the worker is detached and
    /// its in-flight command may still be running; callers must not
    /// assume the external command has ceased. Stopping a job with no
    /// active worker is a successful no-op.
    pub async fn stop(&self, job_id: &str) -> Result<(), AutomationError> {
        let entry = self.entry(job_id)?;

        let worker = {
            let mut state = entry.state.lock();
            state.status = JobStatus::Stopped;
            state.next_run_at = None;
            state.worker.take()
        };

        match worker {
            Some(handle) => {
                handle.stop.store(true, Ordering::SeqCst);
                match timeout(self.stop_timeout, handle.join).await {
                    Ok(_) => info!("Stopped job '{}'", job_id),
                    Err(_) => warn!(
                        "Worker for job '{}' did not exit within {:?}; detaching \
                         (its in-flight command may still be running)",
                        job_id, self.stop_timeout
                    ),
                }
            }
            None => info!("Stop requested for job '{}' with no active worker", job_id),
        }

        Ok(())
    }

    /// Execute a job once, immediately and synchronously, without
    /// touching its continuous schedule.
    ///
    /// The job's status is captured before the run and restored after,
    /// so a running job stays Running and a stopped job stays Stopped;
    /// only counters, timestamps and `last_error` change. This may
    /// overlap with the job's own worker loop; concurrent execution
    /// against the same external resource is the caller's risk.
    pub async fn run_once(&self, job_id: &str) -> Result<bool, AutomationError> {
        let entry = self.entry(job_id)?;
        info!("Running job '{}' once", job_id);

        let prior = entry.state.lock().status;
        let outcome = self.runner.execute(&entry.spec, &entry.state).await;
        entry.state.lock().status = prior;

        Ok(outcome.is_success())
    }

    /// Assemble the aggregate status view.
    ///
    /// A pure read: per-job snapshots under each job's own lock, plus a
    /// best-effort stats snapshot. Never fails and never mutates any
    /// job state.
    pub async fn status(&self) -> AutomationStatus {
        let tasks = self
            .jobs
            .iter()
            .map(|e| e.state.lock().snapshot(&e.spec))
            .collect();

        let counts = self.reporter.snapshot().await;
        AutomationStatus::assemble(tasks, counts, self.started_at, Utc::now())
    }

    /// Start every registered job.
    pub async fn start_all(&self) {
        info!("Starting all automation jobs");
        for entry in &self.jobs {
            if let Err(e) = self.start(&entry.spec.id).await {
                warn!("Failed to start job '{}': {}", entry.spec.id, e);
            }
        }
    }

    /// Stop every registered job. Used by the shutdown path.
    pub async fn stop_all(&self) {
        info!("Stopping all automation jobs");
        for entry in &self.jobs {
            if let Err(e) = self.stop(&entry.spec.id).await {
                warn!("Failed to stop job '{}': {}", entry.spec.id, e);
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
