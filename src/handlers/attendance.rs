//! Attendance handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use crate::compliance::roster::Roster;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{AttendanceRecord, RecordAttendanceRequest, VerifyAttendanceRequest};
use crate::services::attendance::AttendanceCommand;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceQuery {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
}

pub async fn query(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AttendanceQuery>,
) -> Result<Json<ApiResponse<Vec<AttendanceRecord>>>> {
    let records = state
        .services
        .attendance_service
        .query(query.event_id, query.participant_id)
        .await?;
    Ok(ok(records))
}

/// Check-in, check-out or verification code entry
pub async fn record(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RecordAttendanceRequest>,
) -> Result<Json<ApiResponse<AttendanceRecord>>> {
    let command = AttendanceCommand::try_from(request)?;
    Ok(ok(state.services.attendance_service.record(command).await?))
}

pub async fn roster(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(event_id): PathParam<i64>,
) -> Result<Json<ApiResponse<Roster>>> {
    Ok(ok(state.services.attendance_service.event_roster(event_id).await?))
}

pub async fn verify(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<VerifyAttendanceRequest>,
) -> Result<Json<ApiResponse<AttendanceRecord>>> {
    let record = state
        .services
        .attendance_service
        .verify(id, request.verified, user.actor())
        .await?;
    Ok(ok(record))
}
