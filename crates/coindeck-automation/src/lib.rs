//! # Coindeck Automation
//!
//! Process-local automation task controller for the Coindeck backend.
//!
//! A fixed registry of named background jobs (price collection, news
//! aggregation, market analysis) runs on independent intervals, each on
//! its own worker task. The controller exposes per-job start/stop and
//! run-once control, per-job success/error counters, and an aggregate
//! status snapshot consumed by the HTTP layer.
//!
//! ## Features
//!
//! - One worker task per running job, never more (idempotent start)
//! - Cooperative stop signalling, observed within ~1 second
//! - Run-once execution that leaves the continuous schedule untouched
//! - Worker crash containment (a panicking job cannot affect siblings)
//! - Best-effort system health snapshot that never fails
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coindeck_automation::{AutomationConfig, Controller, ProcessExecutor};
//!
//! let config = AutomationConfig::default();
//! let controller = Controller::new(config, executor, stats);
//! controller.start("price_collection").await?;
//! let status = controller.status().await;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod job;
pub mod reporter;
pub mod runner;
pub mod status;
pub mod worker;

// Re-exports
pub use config::AutomationConfig;
pub use controller::Controller;
pub use error::AutomationError;
pub use executor::{CommandExecutor, CommandOutput, ExecError, ProcessExecutor};
pub use job::{CommandSpec, JobSnapshot, JobSpec, JobStatus};
pub use reporter::{RecordCounts, StatsError, StatsSource, StatusReporter};
pub use runner::{JobRunner, Outcome};
pub use status::{AutomationStatus, DataStats, DatabaseStatus, SystemHealth};
