//! Certificate handlers

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{Certificate, IssueCertificateRequest, RevokeCertificateRequest, UpdateCertificateRequest};
use crate::services::{CertificateVerification, Eligibility};
use crate::state::AppState;
use crate::utils::errors::{AceError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct CertificateQuery {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub provider_id: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<CertificateQuery>,
) -> Result<Json<ApiResponse<Vec<Certificate>>>> {
    let certificates = state
        .services
        .certificate_service
        .list(query.event_id, query.participant_id, query.provider_id)
        .await?;
    Ok(ok(certificates))
}

pub async fn issue(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    JsonBody(request): JsonBody<IssueCertificateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Certificate>>)> {
    let (Some(event_id), Some(participant_id)) = (request.event_id, request.participant_id) else {
        return Err(AceError::validation("Missing required fields: event_id, participant_id"));
    };

    let certificate = state
        .services
        .certificate_service
        .issue(event_id, participant_id, user.actor())
        .await?;
    Ok(created(certificate))
}

pub async fn eligibility(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CertificateQuery>,
) -> Result<Json<ApiResponse<Eligibility>>> {
    let (Some(event_id), Some(participant_id)) = (query.event_id, query.participant_id) else {
        return Err(AceError::validation("Missing required parameters: event_id, participant_id"));
    };
    Ok(ok(state.services.certificate_service.eligibility(event_id, participant_id).await?))
}

/// Public lookup by certificate number
pub async fn verify(
    State(state): State<AppState>,
    PathParam(number): PathParam<String>,
) -> Result<Json<ApiResponse<CertificateVerification>>> {
    Ok(ok(state.services.certificate_service.verify(&number).await?))
}

pub async fn document(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> Result<impl IntoResponse> {
    let html = state.services.certificate_service.document(id).await?;
    Ok(([(CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

pub async fn revoke(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<RevokeCertificateRequest>,
) -> Result<Json<ApiResponse<Certificate>>> {
    let reason = request
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AceError::validation("Missing required field: reason"))?;

    let certificate = state
        .services
        .certificate_service
        .revoke(id, reason, user.actor())
        .await?;
    Ok(ok(certificate))
}

/// Set a certificate to pending or issued, or revoke it with a reason
pub async fn update_status(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateCertificateRequest>,
) -> Result<Json<ApiResponse<Certificate>>> {
    let certificate = state
        .services
        .certificate_service
        .update_status(id, request, user.actor())
        .await?;
    Ok(ok(certificate))
}
