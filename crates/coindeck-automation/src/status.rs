//! Aggregate automation status view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{JobSnapshot, JobStatus};
use crate::reporter::RecordCounts;

/// Storage connectivity as derived from the record counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    /// At least one record is visible.
    Connected,
    /// No records visible, or the stats query failed.
    Disconnected,
}

/// Process-level health summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    /// Storage connectivity.
    pub database_status: DatabaseStatus,
    /// API layer status; the process answering at all means healthy.
    pub api_status: String,
    /// Running if any job is running, stopped otherwise.
    pub scheduler_status: JobStatus,
    /// Total price records stored.
    pub total_records: u64,
    /// Most recent execution attempt across all jobs.
    pub latest_update: DateTime<Utc>,
    /// Process uptime, formatted "XhYm".
    pub uptime: String,
}

/// Data-volume statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStats {
    /// Total price records stored.
    pub total_price_records: u64,
    /// Total news articles stored.
    pub total_news_articles: u64,
    /// Distinct coins with at least one price record.
    pub coins_tracked: u64,
    /// Most recent execution attempt across all jobs.
    pub last_data_update: DateTime<Utc>,
    /// Human-readable refresh cadence.
    pub update_frequency: String,
}

/// The full aggregate view returned by `Controller::status()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationStatus {
    /// Per-job snapshots, in registry order.
    pub tasks: Vec<JobSnapshot>,
    /// Process-level health summary.
    pub system_health: SystemHealth,
    /// Data-volume statistics.
    pub data_stats: DataStats,
}

impl AutomationStatus {
    /// Assemble the aggregate view from per-job snapshots and counts.
    pub fn assemble(
        tasks: Vec<JobSnapshot>,
        counts: RecordCounts,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let any_running = tasks.iter().any(|t| t.status == JobStatus::Running);
        let scheduler_status = if any_running {
            JobStatus::Running
        } else {
            JobStatus::Stopped
        };

        let latest_update = tasks
            .iter()
            .filter_map(|t| t.last_run)
            .max()
            .unwrap_or(now);

        let database_status = if counts.price_records > 0 {
            DatabaseStatus::Connected
        } else {
            DatabaseStatus::Disconnected
        };

        let update_frequency = if any_running {
            "5 minutes".to_string()
        } else {
            "Manual".to_string()
        };

        Self {
            system_health: SystemHealth {
                database_status,
                api_status: "healthy".to_string(),
                scheduler_status,
                total_records: counts.price_records,
                latest_update,
                uptime: format_uptime(now - started_at),
            },
            data_stats: DataStats {
                total_price_records: counts.price_records,
                total_news_articles: counts.news_articles,
                coins_tracked: counts.coins_tracked,
                last_data_update: latest_update,
                update_frequency,
            },
            tasks,
        }
    }
}

/// Format an uptime duration as "XhYm".
pub fn format_uptime(elapsed: chrono::Duration) -> String {
    let total_secs = elapsed.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}
