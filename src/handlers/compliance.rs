//! Compliance dashboard, retention and audit handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use crate::compliance::audit::EventAudit;
use crate::compliance::export::{ComplianceReport, ExportRequest};
use crate::compliance::retention::RetentionStatus;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::state::AppState;
use crate::utils::errors::{AceError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct ProviderQuery {
    pub provider_id: Option<i64>,
}

impl ProviderQuery {
    fn require(&self) -> Result<i64> {
        self.provider_id
            .ok_or_else(|| AceError::validation("Missing required parameter: provider_id"))
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<ProviderQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let provider_id = query.require()?;
    Ok(ok(state.services.compliance_service.dashboard(provider_id).await?))
}

pub async fn retention(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<ProviderQuery>,
) -> Result<Json<ApiResponse<Vec<RetentionStatus>>>> {
    let provider_id = query.require()?;
    Ok(ok(state.services.compliance_service.retention(provider_id).await?))
}

pub async fn export(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    JsonBody(request): JsonBody<ExportRequest>,
) -> Result<Json<ApiResponse<ComplianceReport>>> {
    Ok(ok(state.services.compliance_service.export(request).await?))
}

pub async fn audit_checklist(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(event_id): PathParam<i64>,
) -> Result<Json<ApiResponse<EventAudit>>> {
    Ok(ok(state.services.compliance_service.event_audit_checklist(event_id).await?))
}
