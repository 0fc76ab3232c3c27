//! Complaint handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::compliance::deadlines::ComplaintView;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{SubmitComplaintRequest, UpdateComplaintRequest};
use crate::services::complaint::{parse_status, SUBMITTED_MESSAGE};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct ComplaintQuery {
    pub provider_id: Option<i64>,
    pub status: Option<String>,
}

/// Acknowledgement returned to the submitter
#[derive(Debug, Serialize)]
pub struct ComplaintReceipt {
    pub complaint_id: i64,
    pub response_due_date: DateTime<Utc>,
    pub message: &'static str,
}

pub async fn submit(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubmitComplaintRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ComplaintReceipt>>)> {
    let (complaint, due) = state.services.complaint_service.submit(request).await?;
    Ok(created(ComplaintReceipt {
        complaint_id: complaint.id,
        response_due_date: due,
        message: SUBMITTED_MESSAGE,
    }))
}

pub async fn list(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<ComplaintQuery>,
) -> Result<Json<ApiResponse<Vec<ComplaintView>>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(Some(raw))?),
        None => None,
    };
    Ok(ok(state.services.complaint_service.list(query.provider_id, status).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<ComplaintView>>> {
    Ok(ok(state.services.complaint_service.get(id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateComplaintRequest>,
) -> Result<Json<ApiResponse<ComplaintView>>> {
    Ok(ok(state.services.complaint_service.update_status(id, request, user.actor()).await?))
}
