//! Event handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::compliance::credits::{
    calculation_summary, format_credits, quiz_distribution, CalculationSummary, QuizDistribution, MAX_DURATION_MINUTES,
};
use crate::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::auth::Coordinator;
use crate::models::{
    AssignInstructorRequest, CeCategory, ChangeStatusRequest, CreateEventRequest, Event, EventFilter, EventInstructor,
    EventSubtype, EventType, Modality, UpdateEventRequest,
};
use crate::services::event::{parse_status, EventDetail, Transition};
use crate::state::AppState;
use crate::utils::errors::{AceError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub provider_id: Option<i64>,
    pub category: Option<CeCategory>,
    pub modality: Option<Modality>,
    #[serde(default)]
    pub upcoming: bool,
}

/// Status change result with the applied transition
#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub success: bool,
    pub data: Event,
    pub transition: Transition,
}

/// Public catalogue, or every event of one provider
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EventListQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>> {
    let events = &state.services.event_service;
    let result = match query.provider_id {
        Some(provider_id) => events.list_by_provider(provider_id).await?,
        None => {
            let filter = EventFilter {
                category: query.category,
                modality: query.modality,
                upcoming: query.upcoming,
            };
            events.list_public(&filter).await?
        }
    };
    Ok(ok(result))
}

pub async fn create(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>)> {
    debug!(actor = %user.actor(), provider_id = request.provider_id, "Create event request");
    let event = state.services.event_service.create_event(request).await?;
    Ok(created(event))
}

pub async fn get_one(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> Result<Json<ApiResponse<EventDetail>>> {
    Ok(ok(state.services.event_service.get_event(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> Result<Json<ApiResponse<Event>>> {
    Ok(ok(state.services.event_service.update_event(id, request).await?))
}

pub async fn change_status(
    State(state): State<AppState>,
    Coordinator(user): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<ChangeStatusRequest>,
) -> Result<Json<StatusChange>> {
    let requested = parse_status(request.status.as_deref())?;
    let (event, transition) = state
        .services
        .event_service
        .change_status(id, requested, Some(user.actor()))
        .await?;

    Ok(Json(StatusChange { success: true, data: event, transition }))
}

pub async fn assign_instructor(
    State(state): State<AppState>,
    Coordinator(_): Coordinator,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<AssignInstructorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventInstructor>>)> {
    Ok(created(state.services.event_service.assign_instructor(id, request).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreditQuery {
    pub duration_minutes: Option<i64>,
    pub event_type: Option<EventType>,
    pub event_subtype: Option<EventSubtype>,
}

#[derive(Debug, Serialize)]
pub struct CreditCalculation {
    #[serde(flatten)]
    pub summary: CalculationSummary,
    pub formatted: String,
    pub quiz_distribution: QuizDistribution,
}

/// Credit calculator for event planning
pub async fn calculate_credits(QueryParams(query): QueryParams<CreditQuery>) -> Result<Json<ApiResponse<CreditCalculation>>> {
    let duration = query
        .duration_minutes
        .ok_or_else(|| AceError::validation("Missing required parameter: duration_minutes"))?;
    if duration > MAX_DURATION_MINUTES {
        return Err(AceError::validation(format!(
            "duration_minutes cannot exceed {}",
            MAX_DURATION_MINUTES
        )));
    }
    let event_type = query.event_type.unwrap_or(EventType::Ce);

    let summary = calculation_summary(duration, event_type, query.event_subtype.unwrap_or(EventSubtype::Standard));
    let formatted = format_credits(summary.ceus, event_type);
    let distribution = quiz_distribution(duration, i64::from(summary.minimum_questions));

    Ok(ok(CreditCalculation { summary, formatted, quiz_distribution: distribution }))
}
