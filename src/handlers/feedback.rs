//! Feedback handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{FeedbackResponse, ReviewFeedbackRequest, SubmitFeedbackRequest};
use crate::services::EventFeedback;
use crate::state::AppState;
use crate::utils::errors::{AceError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub event_id: Option<i64>,
}

pub async fn submit(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponse>>)> {
    Ok(created(state.services.feedback_service.submit(request).await?))
}

pub async fn for_event(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    QueryParams(query): QueryParams<FeedbackQuery>,
) -> Result<Json<ApiResponse<EventFeedback>>> {
    let event_id = query
        .event_id
        .ok_or_else(|| AceError::validation("Missing required parameter: event_id"))?;
    Ok(ok(state.services.feedback_service.for_event(event_id).await?))
}

pub async fn review(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<ReviewFeedbackRequest>,
) -> Result<Json<ApiResponse<FeedbackResponse>>> {
    Ok(ok(state.services.feedback_service.review(id, request, user.actor()).await?))
}
