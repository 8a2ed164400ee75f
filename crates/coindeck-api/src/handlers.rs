//! Automation route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::info;

use coindeck_automation::{AutomationError, AutomationStatus};

use crate::state::ApiState;

/// Response for job control endpoints.
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    pub task: String,
}

/// Health summary response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub scheduler_status: String,
    pub uptime: String,
}

fn unknown_job(id: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("Unknown task '{}'", id)})),
    )
}

/// Aggregate automation status.
///
/// GET /api/automation/status
pub async fn automation_status(State(state): State<Arc<ApiState>>) -> Json<AutomationStatus> {
    Json(state.controller.status().await)
}

/// Start a job's continuous worker.
///
/// POST /api/automation/tasks/{id}/start
pub async fn start_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Start requested for task '{}'", id);
    match state.controller.start(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!(ControlResponse {
                success: true,
                task: id,
            })),
        ),
        Err(AutomationError::UnknownJob(_)) => unknown_job(&id),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// Stop a job's continuous worker.
///
/// POST /api/automation/tasks/{id}/stop
pub async fn stop_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Stop requested for task '{}'", id);
    match state.controller.stop(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!(ControlResponse {
                success: true,
                task: id,
            })),
        ),
        Err(AutomationError::UnknownJob(_)) => unknown_job(&id),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// Run a job once without touching its schedule.
///
/// POST /api/automation/tasks/{id}/run
pub async fn run_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("One-off run requested for task '{}'", id);
    match state.controller.run_once(&id).await {
        Ok(success) => (
            StatusCode::OK,
            Json(serde_json::json!(ControlResponse { success, task: id })),
        ),
        Err(AutomationError::UnknownJob(_)) => unknown_job(&id),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// Scheduler health summary.
///
/// GET /health
pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let status = state.controller.status().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        scheduler_status: status.system_health.scheduler_status.to_string(),
        uptime: status.system_health.uptime,
    })
}

/// Liveness probe. The process answering is the whole check.
///
/// GET /livez
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
