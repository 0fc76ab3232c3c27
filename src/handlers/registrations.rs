//! Registration handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ok_with_message, ApiResponse};
use crate::middleware::auth::{AuthUser, Coordinator};
use crate::models::{RegisterRequest, Registration};
use crate::services::registration::WAITLIST_MESSAGE;
use crate::state::AppState;
use crate::utils::errors::{AceError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationQuery {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Registration>>)> {
    let registration = state.services.registration_service.register(request).await?;
    Ok(created(registration))
}

pub async fn join_waitlist(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Registration>>)> {
    let registration = state.services.registration_service.join_waitlist(request).await?;
    Ok((StatusCode::CREATED, ok_with_message(registration, WAITLIST_MESSAGE)))
}

pub async fn cancel(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<Registration>>> {
    Ok(ok(state.services.registration_service.cancel(id).await?))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<Registration>>> {
    Ok(ok(state.services.registration_service.mark_payment_complete(id).await?))
}

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(query): QueryParams<RegistrationQuery>,
) -> Result<Json<ApiResponse<Vec<Registration>>>> {
    let registrations = &state.services.registration_service;
    let result = match (query.event_id, query.participant_id) {
        (Some(event_id), _) => registrations.list_by_event(event_id).await?,
        (None, Some(participant_id)) => registrations.list_by_participant(participant_id).await?,
        (None, None) => return Err(AceError::validation("Please provide event_id or participant_id parameter")),
    };
    Ok(ok(result))
}
