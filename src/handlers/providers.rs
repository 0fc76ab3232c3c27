//! Provider handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::{Admin, AuthUser, Coordinator};
use crate::models::{CreateProviderRequest, Provider, ProviderStats, RecordPaymentRequest, UpdateProviderRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct ProviderListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Provider application; any signed-in user may apply
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<CreateProviderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Provider>>)> {
    let provider = state.services.provider_service.create(request).await?;
    info!(provider_id = provider.id, applicant = %user.actor(), "Provider application received");
    Ok(created(provider))
}

pub async fn list(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<ProviderListQuery>,
) -> Result<Json<ApiResponse<Vec<Provider>>>> {
    Ok(ok(state.services.provider_service.list(query.active_only).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<Provider>>> {
    Ok(ok(state.services.provider_service.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateProviderRequest>,
) -> Result<Json<ApiResponse<Provider>>> {
    Ok(ok(state.services.provider_service.update(id, request).await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Admin(user): Admin,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<Provider>>> {
    Ok(ok(state.services.provider_service.approve(id, user.actor()).await?))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Admin(user): Admin,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<RecordPaymentRequest>,
) -> Result<Json<ApiResponse<Provider>>> {
    Ok(ok(state.services.provider_service.record_payment(id, request, user.actor()).await?))
}

pub async fn stats(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<ProviderStats>>> {
    Ok(ok(state.services.provider_service.stats(id).await?))
}
