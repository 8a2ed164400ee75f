//! Best-effort system statistics snapshot.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

/// Record counts reported by the storage collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Total price records stored.
    pub price_records: u64,
    /// Total news articles stored.
    pub news_articles: u64,
    /// Distinct coins with at least one price record.
    pub coins_tracked: u64,
}

/// Error raised by a statistics source.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The underlying query failed.
    #[error("Stats query failed: {0}")]
    Query(String),
}

/// Storage collaborator exposing one read of record counts.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Count stored records.
    async fn record_counts(&self) -> Result<RecordCounts, StatsError>;
}

/// Assembles the aggregate data-volume view for `status()`.
///
/// This is a best-effort diagnostic: any failure or timeout of the
/// underlying query degrades to all-zero counts rather than failing
/// the status call.
pub struct StatusReporter {
    source: Arc<dyn StatsSource>,
    query_timeout: Duration,
}

impl StatusReporter {
    /// Create a reporter over the given source with a query timeout.
    pub fn new(source: Arc<dyn StatsSource>, query_timeout: Duration) -> Self {
        Self {
            source,
            query_timeout,
        }
    }

    /// Take a snapshot of the record counts, zeroed on any failure.
    pub async fn snapshot(&self) -> RecordCounts {
        match timeout(self.query_timeout, self.source.record_counts()).await {
            Ok(Ok(counts)) => counts,
            Ok(Err(e)) => {
                warn!("Stats query failed, reporting zero counts: {}", e);
                RecordCounts::default()
            }
            Err(_) => {
                warn!(
                    "Stats query timed out after {:?}, reporting zero counts",
                    self.query_timeout
                );
                RecordCounts::default()
            }
        }
    }
}
