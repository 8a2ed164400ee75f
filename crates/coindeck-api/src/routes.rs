//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::ApiState;

/// Create the API router.
///
/// ## Route Structure
///
/// ```text
/// /api/automation
///   GET  /api/automation/status            - Aggregate status snapshot
///   POST /api/automation/tasks/{id}/start  - Start a job
///   POST /api/automation/tasks/{id}/stop   - Stop a job
///   POST /api/automation/tasks/{id}/run    - Run a job once
///
/// /health - Scheduler health summary
/// /livez  - Liveness probe
/// ```
pub fn create_router(state: Arc<ApiState>) -> Router {
    let automation_routes = Router::new()
        .route("/status", get(handlers::automation_status))
        .route("/tasks/{id}/start", post(handlers::start_task))
        .route("/tasks/{id}/stop", post(handlers::stop_task))
        .route("/tasks/{id}/run", post(handlers::run_task))
        .with_state(state.clone());

    let health_route = Router::new()
        .route("/health", get(handlers::health))
        .with_state(state);

    // Liveness probe has no state dependency
    let liveness_route = Router::new().route("/livez", get(handlers::liveness));

    Router::new()
        .nest("/api/automation", automation_routes)
        .merge(health_route)
        .merge(liveness_route)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
