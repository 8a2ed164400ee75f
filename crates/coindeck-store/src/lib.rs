//! # Coindeck Store
//!
//! SQLite access for the automation status view. The dashboard's query
//! surface lives elsewhere; this crate only bootstraps the schema and
//! answers the one read the controller needs: total price records,
//! total news articles, and distinct coins tracked.

pub mod schema;
pub mod store;

pub use store::{SqliteStats, StoreError};
