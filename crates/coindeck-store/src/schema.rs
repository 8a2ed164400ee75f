//! Schema bootstrap for the dashboard tables the counts come from.

use rusqlite::Connection;

/// Create the tables backing the record counts, if missing.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS crypto_prices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            coin_id TEXT NOT NULL,
            price_usd REAL NOT NULL,
            market_cap REAL,
            volume_24h REAL,
            timestamp TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_crypto_prices_coin_id
            ON crypto_prices(coin_id);

        CREATE TABLE IF NOT EXISTS news_articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            url TEXT NOT NULL UNIQUE,
            source TEXT,
            published_at TEXT
        );",
    )
}
