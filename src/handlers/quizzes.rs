//! Quiz handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crate::handlers::extract::{JsonBody, PathParam};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{AddQuestionRequest, CreateQuizRequest, Quiz, QuizQuestion, SubmitQuizRequest};
use crate::services::quiz::QuizDetail;
use crate::services::QuizOutcome;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn create(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    JsonBody(request): JsonBody<CreateQuizRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Quiz>>)> {
    Ok(created(state.services.quiz_service.create(request).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<QuizDetail>>> {
    Ok(ok(state.services.quiz_service.with_questions(id).await?))
}

pub async fn add_question(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(quiz_id): PathParam<i64>,
    JsonBody(request): JsonBody<AddQuestionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuizQuestion>>)> {
    Ok(created(state.services.quiz_service.add_question(quiz_id, request).await?))
}

pub async fn deactivate_question(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(question_id): PathParam<i64>,
) -> Result<Json<ApiResponse<QuizQuestion>>> {
    Ok(ok(state.services.quiz_service.deactivate_question(question_id).await?))
}

/// Grade one attempt
pub async fn submit(
    State(state): State<AppState>,
    PathParam(quiz_id): PathParam<i64>,
    JsonBody(request): JsonBody<SubmitQuizRequest>,
) -> Result<Json<ApiResponse<QuizOutcome>>> {
    Ok(ok(state.services.quiz_service.submit(quiz_id, request).await?))
}
