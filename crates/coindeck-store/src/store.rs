//! SQLite-backed statistics source.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio_rusqlite::Connection;
use tracing::debug;

use coindeck_automation::{RecordCounts, StatsError, StatsSource};

use crate::schema::init_schema;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    Connection(String),

    /// A query failed.
    #[error("Query failed: {0}")]
    Query(String),
}

/// SQLite statistics source for the automation status view.
pub struct SqliteStats {
    conn: Connection,
}

impl SqliteStats {
    /// Open an in-memory database. Used in tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Open a file-backed database, creating the schema if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl StatsSource for SqliteStats {
    async fn record_counts(&self) -> Result<RecordCounts, StatsError> {
        let counts = self
            .conn
            .call(|conn| {
                let price_records: i64 =
                    conn.query_row("SELECT COUNT(*) FROM crypto_prices", [], |r| r.get(0))?;
                let news_articles: i64 =
                    conn.query_row("SELECT COUNT(*) FROM news_articles", [], |r| r.get(0))?;
                let coins_tracked: i64 = conn.query_row(
                    "SELECT COUNT(DISTINCT coin_id) FROM crypto_prices",
                    [],
                    |r| r.get(0),
                )?;

                Ok(RecordCounts {
                    price_records: price_records as u64,
                    news_articles: news_articles as u64,
                    coins_tracked: coins_tracked as u64,
                })
            })
            .await
            .map_err(|e| StatsError::Query(e.to_string()))?;

        debug!(
            "Record counts: {} prices, {} articles, {} coins",
            counts.price_records, counts.news_articles, counts.coins_tracked
        );
        Ok(counts)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
