//! Liveness endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;
use crate::services::ServiceHealthStatus;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub name: &'static str,
    pub version: &'static str,
    pub healthy: bool,
    #[serde(flatten)]
    pub status: ServiceHealthStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let status = state.services.health_check().await;
    let healthy = status.is_healthy();
    let issues = status.get_issues();
    if !healthy {
        warn!(?issues, "Health check failed");
    }

    let code = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let report = HealthReport {
        name: crate::NAME,
        version: crate::VERSION,
        healthy,
        status,
        issues,
    };
    (code, Json(report))
}
