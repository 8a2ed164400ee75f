//! # Coindeck API
//!
//! Thin HTTP layer over the automation controller. Routes map directly
//! onto the controller contract:
//!
//! - `GET  /api/automation/status` - aggregate status snapshot
//! - `POST /api/automation/tasks/{id}/start` - start a job
//! - `POST /api/automation/tasks/{id}/stop` - stop a job
//! - `POST /api/automation/tasks/{id}/run` - run a job once
//! - `GET  /health` - scheduler health summary
//! - `GET  /livez` - liveness probe
//!
//! Unknown job ids map to 404 with a JSON error body.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::ApiState;
