//! HTTP handlers module
//!
//! Handlers are grouped by resource. Each one extracts its inputs, calls the
//! matching service and wraps the result as `{ "success": true, "data": ... }`.
//! Errors render through [`crate::utils::errors::AceError`].

pub mod attendance;
pub mod certificates;
pub mod complaints;
pub mod compliance;
pub mod events;
pub mod extract;
pub mod feedback;
pub mod health;
pub mod instructors;
pub mod providers;
pub mod quizzes;
pub mod registrations;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use crate::middleware::logging::{assign_request_id, trace_layer};
use crate::middleware::rate_limit::enforce_rate_limit;
use crate::state::AppState;

/// Success envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { success: true, data, message: None })
}

pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse { success: true, data, message: Some(message.into()) })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let limit = from_fn_with_state(state.rate_limiter.clone(), enforce_rate_limit);

    Router::new()
        .route("/health", get(health::health))
        // events
        .route("/api/ace/events", get(events::list).post(events::create))
        .route("/api/ace/credits/calculate", get(events::calculate_credits))
        .route("/api/ace/events/:id", get(events::get_one).patch(events::update))
        .route("/api/ace/events/:id/status", post(events::change_status))
        .route("/api/ace/events/:id/instructors", post(events::assign_instructor))
        .route("/api/ace/events/:id/audit-checklist", get(compliance::audit_checklist))
        // registrations
        .route("/api/ace/registrations", get(registrations::list).post(registrations::register))
        .route("/api/ace/registrations/waitlist", post(registrations::join_waitlist))
        .route("/api/ace/registrations/:id/cancel", post(registrations::cancel))
        .route("/api/ace/registrations/:id/payment", post(registrations::mark_paid))
        // attendance
        .route(
            "/api/ace/attendance",
            get(attendance::query).merge(post(attendance::record).route_layer(limit.clone())),
        )
        .route("/api/ace/attendance/event/:event_id", get(attendance::roster))
        .route("/api/ace/attendance/:id/verify", post(attendance::verify))
        // certificates
        .route("/api/ace/certificates", get(certificates::list).post(certificates::issue))
        .route("/api/ace/certificates/eligibility", get(certificates::eligibility))
        .route(
            "/api/ace/certificates/verify/:number",
            get(certificates::verify).route_layer(limit.clone()),
        )
        .route("/api/ace/certificates/:id", patch(certificates::update_status))
        .route("/api/ace/certificates/:id/document", get(certificates::document))
        .route("/api/ace/certificates/:id/revoke", post(certificates::revoke))
        // feedback
        .route(
            "/api/ace/feedback",
            get(feedback::for_event).merge(post(feedback::submit).route_layer(limit.clone())),
        )
        .route("/api/ace/feedback/:id/review", post(feedback::review))
        // complaints
        .route(
            "/api/ace/complaints",
            get(complaints::list).merge(post(complaints::submit).route_layer(limit.clone())),
        )
        .route("/api/ace/complaints/:id", get(complaints::get_one).patch(complaints::update_status))
        // compliance
        .route("/api/ace/dashboard", get(compliance::dashboard))
        .route("/api/ace/compliance/retention", get(compliance::retention))
        .route("/api/ace/compliance/export", post(compliance::export))
        // providers
        .route("/api/ace/providers", get(providers::list).post(providers::create))
        .route("/api/ace/providers/:id", get(providers::get_one).patch(providers::update))
        .route("/api/ace/providers/:id/approve", post(providers::approve))
        .route("/api/ace/providers/:id/payments", post(providers::record_payment))
        .route("/api/ace/providers/:id/stats", get(providers::stats))
        // instructors
        .route("/api/ace/instructors", get(instructors::list).post(instructors::submit))
        .route("/api/ace/instructors/pending", get(instructors::pending))
        .route("/api/ace/instructors/:id/approve", post(instructors::approve))
        .route("/api/ace/instructors/:id/reject", post(instructors::reject))
        // quizzes
        .route("/api/ace/quizzes", post(quizzes::create))
        .route("/api/ace/quizzes/:id", get(quizzes::get_one))
        .route("/api/ace/quizzes/:id/questions", post(quizzes::add_question))
        .route("/api/ace/quizzes/questions/:id", delete(quizzes::deactivate_question))
        .route("/api/ace/quizzes/:id/submit", post(quizzes::submit).route_layer(limit))
        .layer(cors_layer(&state.settings.server.cors_origins))
        .layer(trace_layer())
        .layer(from_fn(assign_request_id))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let Json(body) = ok_with_message(vec![1, 2], "done");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], serde_json::json!([1, 2]));
        assert_eq!(value["message"], "done");

        let Json(body) = ok("x");
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("message").is_none());
    }
}
