use super::*;

use std::sync::atomic::AtomicU64;

use async_trait::async_trait;

use crate::executor::{CommandOutput, ExecError};
use crate::job::CommandSpec;
use crate::reporter::{RecordCounts, StatsError};

/// Executor that returns a fixed result instantly and counts calls.
struct StubExecutor {
    succeed: bool,
    calls: AtomicU64,
}

impl StubExecutor {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            succeed: true,
            calls: AtomicU64::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            succeed: false,
            calls: AtomicU64::new(0),
        })
    }
}

#[async_trait]
impl CommandExecutor for StubExecutor {
    async fn run(
        &self,
        _command: &CommandSpec,
        _deadline: Duration,
    ) -> Result<CommandOutput, ExecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CommandOutput {
            success: self.succeed,
            stdout: String::new(),
            stderr: if self.succeed {
                String::new()
            } else {
                "stub failure".to_string()
            },
        })
    }
}

/// Executor that panics, for crash-path tests.
struct PanickyExecutor;

#[async_trait]
impl CommandExecutor for PanickyExecutor {
    async fn run(
        &self,
        _command: &CommandSpec,
        _deadline: Duration,
    ) -> Result<CommandOutput, ExecError> {
        panic!("crash in executor");
    }
}

struct ZeroStats;

#[async_trait]
impl StatsSource for ZeroStats {
    async fn record_counts(&self) -> Result<RecordCounts, StatsError> {
        Ok(RecordCounts::default())
    }
}

struct FailingStats;

#[async_trait]
impl StatsSource for FailingStats {
    async fn record_counts(&self) -> Result<RecordCounts, StatsError> {
        Err(StatsError::Query("db down".to_string()))
    }
}

fn test_config(interval_secs: u64) -> AutomationConfig {
    AutomationConfig {
        jobs: vec![
            JobSpec::new(
                "price_collection",
                "Price Collection",
                CommandSpec::new("true", vec![]),
                interval_secs,
            ),
            JobSpec::new(
                "news_aggregation",
                "News Aggregation",
                CommandSpec::new("true", vec![]),
                interval_secs,
            ),
        ],
        ..Default::default()
    }
}

fn controller_with(executor: Arc<dyn CommandExecutor>, interval_secs: u64) -> Controller {
    Controller::new(test_config(interval_secs), executor, Arc::new(ZeroStats))
}

fn job_status(status: &AutomationStatus, id: &str) -> JobStatus {
    status
        .tasks
        .iter()
        .find(|t| t.task_name == id)
        .unwrap()
        .status
}

#[tokio::test]
async fn test_unknown_job_errors() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    assert!(matches!(
        controller.start("bogus").await,
        Err(AutomationError::UnknownJob(_))
    ));
    assert!(matches!(
        controller.stop("bogus").await,
        Err(AutomationError::UnknownJob(_))
    ));
    assert!(matches!(
        controller.run_once("bogus").await,
        Err(AutomationError::UnknownJob(_))
    ));
}

#[tokio::test]
async fn test_job_ids_in_registry_order() {
    let controller = controller_with(StubExecutor::succeeding(), 60);
    assert_eq!(
        controller.job_ids(),
        vec!["price_collection", "news_aggregation"]
    );
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let executor = StubExecutor::succeeding();
    let controller = controller_with(executor.clone(), 60);

    controller.start("price_collection").await.unwrap();
    controller.start("price_collection").await.unwrap();

    // A duplicate worker would produce a second immediate execution
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

    let status = controller.status().await;
    assert_eq!(job_status(&status, "price_collection"), JobStatus::Running);

    controller.stop("price_collection").await.unwrap();
}

#[tokio::test]
async fn test_stop_never_started_job() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    controller.stop("price_collection").await.unwrap();

    let status = controller.status().await;
    let task = &status.tasks[0];
    assert_eq!(task.status, JobStatus::Stopped);
    assert_eq!(task.success_count, 0);
    assert!(task.next_run.is_none());
}

#[tokio::test]
async fn test_stop_clears_schedule() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    controller.start("price_collection").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.stop("price_collection").await.unwrap();

    let status = controller.status().await;
    let task = &status.tasks[0];
    assert_eq!(task.status, JobStatus::Stopped);
    assert!(task.next_run.is_none());
    // The one execution that ran before the stop is still recorded
    assert_eq!(task.success_count, 1);
}

#[tokio::test]
async fn test_run_once_on_stopped_job() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    let ok = controller.run_once("price_collection").await.unwrap();
    assert!(ok);

    let status = controller.status().await;
    let task = &status.tasks[0];
    assert_eq!(task.status, JobStatus::Stopped);
    assert_eq!(task.success_count, 1);
    assert!(task.last_run.is_some());
}

#[tokio::test]
async fn test_run_once_on_running_job() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    controller.start("price_collection").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let before = controller.status().await;
    assert_eq!(job_status(&before, "price_collection"), JobStatus::Running);

    let ok = controller.run_once("price_collection").await.unwrap();
    assert!(ok);

    let after = controller.status().await;
    assert_eq!(job_status(&after, "price_collection"), JobStatus::Running);

    controller.stop("price_collection").await.unwrap();
}

#[tokio::test]
async fn test_run_once_reports_failure() {
    let controller = controller_with(StubExecutor::failing(), 60);

    let ok = controller.run_once("price_collection").await.unwrap();
    assert!(!ok);

    let status = controller.status().await;
    let task = &status.tasks[0];
    assert_eq!(task.error_count, 1);
    assert_eq!(task.success_count, 0);
    assert_eq!(task.last_error.as_deref(), Some("stub failure"));
}

#[tokio::test]
async fn test_status_with_failing_stats_source() {
    let controller = Controller::new(
        test_config(60),
        StubExecutor::succeeding(),
        Arc::new(FailingStats),
    );

    let status = controller.status().await;
    assert_eq!(status.data_stats.total_price_records, 0);
    assert_eq!(status.data_stats.total_news_articles, 0);
    assert_eq!(status.data_stats.coins_tracked, 0);
    assert_eq!(status.tasks.len(), 2);
}

#[tokio::test]
async fn test_concurrent_status_reads_are_well_formed() {
    let controller = Arc::new(controller_with(StubExecutor::succeeding(), 1));
    controller.start("price_collection").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let controller = controller.clone();
        handles.push(tokio::spawn(async move { controller.status().await }));
    }

    for handle in handles {
        let status = handle.await.unwrap();
        assert_eq!(status.tasks.len(), 2);
        for task in &status.tasks {
            assert!(!task.task_name.is_empty());
            assert_eq!(task.interval_secs, 1);
        }
        // The worker never flips a running job's status mid-execution
        assert_eq!(job_status(&status, "price_collection"), JobStatus::Running);
        assert_eq!(job_status(&status, "news_aggregation"), JobStatus::Stopped);
    }

    // Counters are monotonic across sequential reads
    let first = controller.status().await.tasks[0].success_count;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = controller.status().await.tasks[0].success_count;
    assert!(second >= first);

    controller.stop("price_collection").await.unwrap();
}

#[tokio::test]
async fn test_start_stop_within_one_interval() {
    let executor = StubExecutor::succeeding();
    let controller = controller_with(executor.clone(), 2);

    controller.start("price_collection").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

    controller.stop("price_collection").await.unwrap();

    // Well past the interval: the stop must have prevented a second run
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

    let status = controller.status().await;
    assert_eq!(job_status(&status, "price_collection"), JobStatus::Stopped);
    assert_eq!(status.system_health.scheduler_status, JobStatus::Stopped);
}

#[tokio::test]
async fn test_crashed_job_can_be_restarted() {
    let controller = controller_with(Arc::new(PanickyExecutor), 60);

    controller.start("price_collection").await.unwrap();

    // Wait for the crash to land
    let mut crashed = false;
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if job_status(&controller.status().await, "price_collection") == JobStatus::Error {
            crashed = true;
            break;
        }
    }
    assert!(crashed, "worker never reached Error status");

    let status = controller.status().await;
    let task = &status.tasks[0];
    assert!(task.last_error.as_ref().unwrap().contains("crash"));

    // A crashed job is not restarted automatically, but start() works again
    controller.start("price_collection").await.unwrap();
    controller.stop("price_collection").await.unwrap();
}

#[tokio::test]
async fn test_crash_does_not_affect_sibling_jobs() {
    let controller = controller_with(Arc::new(PanickyExecutor), 60);

    controller.start("price_collection").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let status = controller.status().await;
    assert_eq!(job_status(&status, "price_collection"), JobStatus::Error);
    assert_eq!(job_status(&status, "news_aggregation"), JobStatus::Stopped);
}

#[tokio::test]
async fn test_start_all_and_stop_all() {
    let controller = controller_with(StubExecutor::succeeding(), 60);

    controller.start_all().await;
    let status = controller.status().await;
    assert!(status.tasks.iter().all(|t| t.status == JobStatus::Running));
    assert_eq!(status.system_health.scheduler_status, JobStatus::Running);

    controller.stop_all().await;
    let status = controller.status().await;
    assert!(status.tasks.iter().all(|t| t.status == JobStatus::Stopped));
    assert_eq!(status.system_health.scheduler_status, JobStatus::Stopped);
}
