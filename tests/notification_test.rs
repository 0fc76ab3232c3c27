//! Mailgun delivery against a mock HTTP server

mod common;

use std::collections::HashMap;
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use AceDesk::config::settings::MailgunConfig;
use AceDesk::services::{EmailRequest, NotificationService, NotificationStats};
use AceDesk::utils::errors::MailError;
use common::test_settings;

const DOMAIN: &str = "mg.acedesk.example";

fn service_for(server: &MockServer) -> NotificationService {
    let mut settings = test_settings();
    settings.features.email_notifications = true;
    settings.mailgun = Some(MailgunConfig {
        api_base_url: server.uri(),
        domain: DOMAIN.to_string(),
        api_key: "key-test".to_string(),
        sender: "AceDesk <no-reply@acedesk.example>".to_string(),
        timeout_seconds: 5,
    });
    NotificationService::new(&settings).unwrap()
}

fn certificate_email() -> EmailRequest {
    let parameters: HashMap<String, String> = [
        ("participant_name", "Jordan Lee"),
        ("event_title", "Ethics in Practice"),
        ("certificate_number", "ACE-2026-ABC123"),
        ("total_ceus", "2.0"),
        ("provider_name", "Behavior School"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    EmailRequest {
        to: "jordan@example.com".to_string(),
        template_key: "certificate_issued".to_string(),
        parameters,
    }
}

#[tokio::test]
async fn test_send_posts_rendered_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/messages", DOMAIN)))
        .and(header_exists("authorization"))
        .and(body_string_contains("ACE-2026-ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "<20260301.1@mg.acedesk.example>",
            "message": "Queued. Thank you."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert!(service.is_enabled());

    let id = service.send(&certificate_email()).await.unwrap();
    assert_eq!(id, "<20260301.1@mg.acedesk.example>");
}

#[tokio::test]
async fn test_rejected_message_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let err = service.send(&certificate_email()).await.unwrap_err();
    assert_matches!(err, MailError::Rejected { status: 401, ref body } if body == "Forbidden");
}

#[tokio::test]
async fn test_notify_counts_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "<1@mg>" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.notify(certificate_email()).await;
    service.notify(certificate_email()).await;

    assert_eq!(service.get_stats(), NotificationStats { total_sent: 1, total_failed: 1 });
}

#[tokio::test]
async fn test_unknown_template_never_reaches_mailgun() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let request = EmailRequest {
        to: "jordan@example.com".to_string(),
        template_key: "newsletter".to_string(),
        parameters: HashMap::new(),
    };

    assert_matches!(service.send(&request).await, Err(MailError::UnknownTemplate(_)));
}
