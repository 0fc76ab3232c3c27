//! Router tests that never reach the database
//!
//! Every request here is rejected by authentication, authorization, rate
//! limiting or input validation before a handler touches storage.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use AceDesk::models::UserRole;
use AceDesk::router;
use common::*;

#[tokio::test]
async fn test_coordinator_routes_require_token() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/dashboard?provider_id=1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication error: Missing authorization token");
}

#[tokio::test]
async fn test_participant_token_is_forbidden_on_coordinator_routes() {
    let settings = test_settings();
    let token = token(&settings, "participant@example.com", UserRole::Participant);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(get_request("/api/ace/compliance/retention?provider_id=1", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Permission denied: ACE coordinator privileges required");
}

#[tokio::test]
async fn test_provider_approval_requires_admin() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(Method::POST, "/api/ace/providers/7/approve", Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let mut other = test_settings();
    other.auth.jwt_secret = "some-other-secret".to_string();
    let forged = token(&other, "admin@example.com", UserRole::Admin);
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/instructors/pending", Some(&forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_requires_provider_id() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(get_request("/api/ace/dashboard", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing required parameter: provider_id");
}

#[tokio::test]
async fn test_invalid_event_status_is_rejected() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/ace/events/3/status",
            Some(&token),
            json!({ "status": "published" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid status: \"published\""));
    assert!(message.contains("pending_approval"));
}

#[tokio::test]
async fn test_missing_status_is_rejected() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(Method::POST, "/api/ace/events/3/status", Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing required field: status");
}

#[tokio::test]
async fn test_certificate_issue_requires_ids() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(Method::POST, "/api/ace/certificates", Some(&token), json!({ "event_id": 4 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required fields: event_id, participant_id"
    );
}

#[tokio::test]
async fn test_attendance_action_is_validated() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/ace/attendance",
            None,
            json!({ "event_id": 1, "participant_id": 2, "action": "wave" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Invalid action. Must be \"check_in\", \"check_out\", or \"verify_code\""
    );
}

#[tokio::test]
async fn test_registration_listing_needs_a_filter() {
    let settings = test_settings();
    let token = token(&settings, "participant@example.com", UserRole::Participant);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(get_request("/api/ace/registrations", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Please provide event_id or participant_id parameter"
    );
}

#[tokio::test]
async fn test_export_requires_report_type() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/ace/compliance/export",
            Some(&token),
            json!({ "provider_id": 1, "report_type": "everything" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid report_type. Must be one of:"));
}

#[tokio::test]
async fn test_public_writes_are_rate_limited() {
    let mut settings = test_settings();
    settings.rate_limit.requests_per_minute = 2;
    settings.rate_limit.burst = 0;
    let app = router(lazy_state(settings));

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let request = json_request(Method::POST, "/api/ace/attendance", None, json!({}));
        let response = app.clone().oneshot(request).await.unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        vec![StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_bypass_limit() {
    let mut settings = test_settings();
    settings.rate_limit.requests_per_minute = 2;
    settings.rate_limit.burst = 0;
    let app = router(lazy_state(settings));

    let mut limited = 0;
    for i in 0..20 {
        let mut request = json_request(Method::POST, "/api/ace/complaints", None, json!({}));
        request
            .headers_mut()
            .insert("x-forwarded-for", format!("198.51.100.{}", i).parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }

    assert_eq!(limited, 18);
}

#[tokio::test]
async fn test_forwarded_for_keys_clients_behind_trusted_proxy() {
    let mut settings = test_settings();
    settings.rate_limit.requests_per_minute = 1;
    settings.rate_limit.burst = 0;
    settings.rate_limit.trust_proxy_headers = true;
    let app = router(lazy_state(settings));

    for client in ["198.51.100.1", "198.51.100.2"] {
        let mut request = json_request(Method::POST, "/api/ace/attendance", None, json!({}));
        request
            .headers_mut()
            .insert("x-forwarded-for", client.parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    }
}

#[tokio::test]
async fn test_reads_are_not_rate_limited() {
    let mut settings = test_settings();
    settings.rate_limit.requests_per_minute = 1;
    settings.rate_limit.burst = 0;
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_request("/api/ace/feedback", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = router(lazy_state(test_settings()));

    let mut request = get_request("/api/ace/dashboard", None);
    request
        .headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_request_id_is_minted() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/dashboard", None))
        .await
        .unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = router(lazy_state(test_settings()));

    let response = app.oneshot(get_request("/api/ace/nothing-here", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_credit_calculator_is_public() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/credits/calculate?duration_minutes=90", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["ceus"], 1.5);
    assert_eq!(body["data"]["minimum_questions"], 9);
    assert_eq!(body["data"]["formatted"], "1.5 CEUs");
}

#[tokio::test]
async fn test_credit_calculator_requires_duration() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/credits/calculate?event_type=pd", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_credit_calculator_rejects_oversized_duration() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/credits/calculate?duration_minutes=9223372036854775807", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "duration_minutes cannot exceed 10080");
}

#[tokio::test]
async fn test_malformed_json_body_is_a_json_400() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/ace/compliance/export",
            Some(&token),
            json!({ "provider_id": "abc" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Failed to deserialize the JSON body"));
}

#[tokio::test]
async fn test_malformed_query_is_a_json_400() {
    let settings = test_settings();
    let token = token(&settings, "coordinator@example.com", UserRole::AceCoordinator);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(get_request("/api/ace/dashboard?provider_id=abc", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Failed to deserialize query string"));
}

#[tokio::test]
async fn test_non_numeric_path_id_is_a_json_400() {
    let app = router(lazy_state(test_settings()));

    let response = app
        .oneshot(get_request("/api/ace/events/not-a-number", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_certificate_status_update_requires_coordinator() {
    let settings = test_settings();
    let token = token(&settings, "participant@example.com", UserRole::Participant);
    let app = router(lazy_state(settings));

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            "/api/ace/certificates/4",
            Some(&token),
            json!({ "status": "pending" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
