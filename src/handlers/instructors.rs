//! Instructor qualification handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::{AuthUser, Coordinator};
use crate::models::{InstructorQualification, ReviewQualificationRequest, SubmitQualificationRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct QualificationQuery {
    pub provider_id: Option<i64>,
    pub user_id: Option<i64>,
}

pub async fn submit(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(request): JsonBody<SubmitQualificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InstructorQualification>>)> {
    Ok(created(state.services.instructor_service.submit(request).await?))
}

pub async fn list(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<QualificationQuery>,
) -> Result<Json<ApiResponse<Vec<InstructorQualification>>>> {
    let qualifications = state
        .services
        .instructor_service
        .list(query.provider_id, query.user_id)
        .await?;
    Ok(ok(qualifications))
}

/// Qualifications waiting for review
pub async fn pending(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
) -> Result<Json<ApiResponse<Vec<InstructorQualification>>>> {
    Ok(ok(state.services.instructor_service.pending().await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<ReviewQualificationRequest>,
) -> Result<Json<ApiResponse<InstructorQualification>>> {
    let qualification = state
        .services
        .instructor_service
        .approve(id, request.notes, user.actor())
        .await?;
    Ok(ok(qualification))
}

pub async fn reject(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<ReviewQualificationRequest>,
) -> Result<Json<ApiResponse<InstructorQualification>>> {
    let qualification = state
        .services
        .instructor_service
        .reject(id, request.notes, user.actor())
        .await?;
    Ok(ok(qualification))
}
