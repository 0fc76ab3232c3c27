//! Notification service implementation
//!
//! Sends transactional email through the Mailgun HTTP API. Messages are
//! rendered from named templates with `{placeholder}` parameters. Delivery
//! problems never fail the request that triggered them; they are logged and
//! counted instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use crate::config::settings::{MailgunConfig, Settings};
use crate::models::{Certificate, Event, Participant, Registration};
use crate::utils::errors::{AceError, MailError, MailResult, Result};
use crate::utils::helpers::{escape_html, format_timestamp};

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"))
}

/// Message template structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub key: String,
    pub subject: String,
    pub html: String,
}

/// A single templated email
#[derive(Debug, Clone)]
pub struct EmailRequest {
    pub to: String,
    pub template_key: String,
    pub parameters: HashMap<String, String>,
}

/// Rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Notification statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_failed: u64,
}

#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: Option<String>,
}

/// Notification service for transactional email
#[derive(Clone, Debug)]
pub struct NotificationService {
    client: Client,
    mailgun: Option<MailgunConfig>,
    enabled: bool,
    templates: Arc<HashMap<String, MessageTemplate>>,
    sent: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = settings
            .mailgun
            .as_ref()
            .map_or(DEFAULT_TIMEOUT_SECONDS, |m| m.timeout_seconds);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent("AceDesk/1.0")
            .build()
            .map_err(AceError::Http)?;

        Ok(Self {
            client,
            mailgun: settings.mailgun.clone(),
            enabled: settings.features.email_notifications && settings.mailgun.is_some(),
            templates: Arc::new(Self::load_default_templates()),
            sent: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Render and deliver one message, returning the Mailgun message id
    pub async fn send(&self, request: &EmailRequest) -> MailResult<String> {
        let mailgun = self
            .mailgun
            .as_ref()
            .ok_or_else(|| MailError::RequestFailed("Mailgun is not configured".to_string()))?;

        let rendered = self.format_message(&request.template_key, &request.parameters)?;
        let url = format!("{}/{}/messages", mailgun.api_base_url.trim_end_matches('/'), mailgun.domain);

        debug!(to = %request.to, template_key = %request.template_key, "Sending email");

        let form = [
            ("from", mailgun.sender.as_str()),
            ("to", request.to.as_str()),
            ("subject", rendered.subject.as_str()),
            ("html", rendered.html.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&mailgun.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }

        let parsed: MailgunResponse = response
            .json()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        Ok(parsed.id.unwrap_or_default())
    }

    /// Deliver a message if email is enabled; failures are logged and counted
    pub async fn notify(&self, request: EmailRequest) {
        if !self.enabled {
            debug!(template_key = %request.template_key, "Email notifications disabled, skipping");
            return;
        }

        match self.send(&request).await {
            Ok(message_id) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                info!(to = %request.to, template_key = %request.template_key, message_id = %message_id, "Email sent successfully");
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!(to = %request.to, template_key = %request.template_key, error = %e, "Failed to send email");
            }
        }
    }

    /// Send registration confirmation to a participant
    pub async fn send_registration_confirmation(&self, participant: &Participant, event: &Event, registration: &Registration) {
        let mut parameters = HashMap::new();
        parameters.insert("first_name".to_string(), participant.first_name.clone());
        parameters.insert("event_title".to_string(), event.title.clone());
        parameters.insert("event_date".to_string(), format_timestamp(event.start_date));
        parameters.insert("confirmation_code".to_string(), registration.confirmation_code.clone());
        parameters.insert("registration_status".to_string(), registration.status.to_string());

        self.notify(EmailRequest {
            to: participant.email.clone(),
            template_key: "registration_confirmation".to_string(),
            parameters,
        })
        .await;
    }

    /// Tell a participant their certificate is ready
    pub async fn send_certificate_issued(&self, certificate: &Certificate) {
        let mut parameters = HashMap::new();
        parameters.insert("participant_name".to_string(), certificate.participant_name.clone());
        parameters.insert("event_title".to_string(), certificate.event_title.clone());
        parameters.insert("certificate_number".to_string(), certificate.certificate_number.clone());
        parameters.insert("total_ceus".to_string(), format!("{:.1}", certificate.total_ceus));
        parameters.insert("provider_name".to_string(), certificate.provider_name.clone());

        self.notify(EmailRequest {
            to: certificate.participant_email.clone(),
            template_key: "certificate_issued".to_string(),
            parameters,
        })
        .await;
    }

    /// Format message using template and parameters
    pub fn format_message(&self, template_key: &str, parameters: &HashMap<String, String>) -> MailResult<RenderedEmail> {
        let template = self
            .templates
            .get(template_key)
            .ok_or_else(|| MailError::UnknownTemplate(template_key.to_string()))?;

        let mut subject = template.subject.clone();
        let mut html = template.html.clone();

        for (key, value) in parameters {
            let placeholder = format!("{{{}}}", key);
            subject = subject.replace(&placeholder, value);
            html = html.replace(&placeholder, &escape_html(value));
        }

        if let Some(missing) = placeholder_re().captures(&subject).or_else(|| placeholder_re().captures(&html)) {
            warn!(template_key = %template_key, parameter = &missing[1], "Template parameter missing");
            return Err(MailError::MissingParameter(missing[1].to_string()));
        }

        Ok(RenderedEmail { subject, html })
    }

    /// Get notification statistics
    pub fn get_stats(&self) -> NotificationStats {
        NotificationStats {
            total_sent: self.sent.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Get available template keys
    pub fn get_template_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.templates.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        let templates = [
            MessageTemplate {
                key: "registration_confirmation".to_string(),
                subject: "Registration received: {event_title}".to_string(),
                html: "<p>Hi {first_name},</p>\
                       <p>Thank you for registering for <strong>{event_title}</strong> on {event_date}.</p>\
                       <p>Your confirmation code is <strong>{confirmation_code}</strong>. \
                       Registration status: {registration_status}.</p>\
                       <p>Keep this code for check-in and certificate lookups.</p>"
                    .to_string(),
            },
            MessageTemplate {
                key: "certificate_issued".to_string(),
                subject: "Your CE certificate for {event_title}".to_string(),
                html: "<p>Hi {participant_name},</p>\
                       <p>Your certificate for <strong>{event_title}</strong> has been issued by {provider_name}.</p>\
                       <p>Certificate number: <strong>{certificate_number}</strong><br>\
                       Credits awarded: {total_ceus}</p>\
                       <p>Anyone can verify this certificate using its number.</p>"
                    .to_string(),
            },
        ];

        templates.into_iter().map(|t| (t.key.clone(), t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NotificationService {
        NotificationService::new(&Settings::default()).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_format_message() {
        let parameters = params(&[
            ("first_name", "Jordan"),
            ("event_title", "Ethics & Supervision"),
            ("event_date", "2026-03-01 15:00 UTC"),
            ("confirmation_code", "ABCD2345"),
            ("registration_status", "confirmed"),
        ]);

        let rendered = service().format_message("registration_confirmation", &parameters).unwrap();
        assert_eq!(rendered.subject, "Registration received: Ethics & Supervision");
        assert!(rendered.html.contains("Ethics &amp; Supervision"));
        assert!(rendered.html.contains("ABCD2345"));
    }

    #[test]
    fn test_missing_parameter_is_reported() {
        let err = service()
            .format_message("certificate_issued", &params(&[("event_title", "Ethics")]))
            .unwrap_err();
        assert!(matches!(err, MailError::MissingParameter(_)));
    }

    #[test]
    fn test_unknown_template() {
        let err = service().format_message("welcome", &HashMap::new()).unwrap_err();
        assert!(matches!(err, MailError::UnknownTemplate(ref key) if key == "welcome"));
    }

    #[test]
    fn test_disabled_without_mailgun_section() {
        let mut settings = Settings::default();
        settings.features.email_notifications = true;
        let service = NotificationService::new(&settings).unwrap();
        assert!(!service.is_enabled());
        assert_eq!(service.get_template_keys(), vec!["certificate_issued", "registration_confirmation"]);
    }

    #[tokio::test]
    async fn test_notify_when_disabled_counts_nothing() {
        let service = service();
        service
            .notify(EmailRequest {
                to: "someone@example.com".to_string(),
                template_key: "certificate_issued".to_string(),
                parameters: HashMap::new(),
            })
            .await;
        assert_eq!(service.get_stats(), NotificationStats::default());
    }
}
