//! Certificate service implementation
//!
//! Eligibility checks, issuance with a snapshot of participant, event and
//! provider details, public verification, revocation and the printable
//! certificate document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::config::settings::ComplianceConfig;
use crate::database::repositories::NewCertificate;
use crate::database::DatabaseService;
use crate::models::{
    Certificate, CertificateStatus, CompletionUpdate, Event, Registration, UpdateCertificateRequest, VerificationMethod,
};
use crate::services::notification::NotificationService;
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::helpers::{escape_html, generate_certificate_number};
use crate::utils::logging::log_certificate_action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilityRequirements {
    pub registered: bool,
    pub attendance_verified: bool,
    pub quiz_passed: bool,
    pub feedback_submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reasons: Vec<String>,
    pub requirements: EligibilityRequirements,
}

/// Certificate eligibility from the participant's confirmed registration
pub fn check_eligibility(event: &Event, registration: Option<&Registration>) -> Eligibility {
    let confirmed = registration.filter(|r| r.is_confirmed());
    let requirements = EligibilityRequirements {
        registered: confirmed.is_some(),
        attendance_verified: confirmed.map_or(false, |r| r.attendance_verified),
        quiz_passed: confirmed.map_or(false, |r| r.quiz_completed),
        feedback_submitted: confirmed.map_or(false, |r| r.feedback_completed),
    };

    let mut reasons = Vec::new();
    if !requirements.registered {
        reasons.push("Not registered for this event".to_string());
    }
    if !requirements.attendance_verified {
        reasons.push("Attendance not verified".to_string());
    }
    if event.verification_method == VerificationMethod::QuizCompletion && !requirements.quiz_passed {
        reasons.push("Quiz not completed/passed".to_string());
    }
    if event.is_async() && !requirements.quiz_passed {
        reasons.push("Quiz required for asynchronous events".to_string());
    }

    Eligibility { eligible: reasons.is_empty(), reasons, requirements }
}

/// Result of a public certificate lookup
#[derive(Debug, Clone, Serialize)]
pub struct CertificateVerification {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PublicCertificate>,
}

/// Fields of a certificate anyone holding its number may see
#[derive(Debug, Clone, Serialize)]
pub struct PublicCertificate {
    pub certificate_number: String,
    pub participant_name: String,
    pub event_title: String,
    pub event_date: String,
    pub total_ceus: f64,
    pub ce_category: String,
    pub provider_name: String,
    pub issued_at: Option<DateTime<Utc>>,
}

pub fn verification_for(certificate: Option<Certificate>) -> CertificateVerification {
    match certificate {
        None => CertificateVerification {
            valid: false,
            message: Some("Certificate not found".to_string()),
            certificate: None,
        },
        Some(c) if c.status == CertificateStatus::Revoked => CertificateVerification {
            valid: false,
            message: Some("Certificate has been revoked".to_string()),
            certificate: None,
        },
        Some(c) => CertificateVerification {
            valid: true,
            message: None,
            certificate: Some(PublicCertificate {
                certificate_number: c.certificate_number,
                participant_name: c.participant_name,
                event_title: c.event_title,
                event_date: c.event_date,
                total_ceus: c.total_ceus,
                ce_category: c.ce_category,
                provider_name: c.provider_name,
                issued_at: c.issued_at,
            }),
        },
    }
}

/// Printable HTML certificate
pub fn render_document(certificate: &Certificate) -> String {
    let issued = certificate
        .issued_at
        .map(|at| at.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Not issued".to_string());
    let bacb_id = certificate.participant_bacb_id.as_deref().unwrap_or("Not provided");
    let provider_number = certificate.provider_number.as_deref().unwrap_or("Not provided");
    let status_banner = match certificate.status {
        CertificateStatus::Issued => String::new(),
        other => format!("<div class=\"status\">{}</div>", escape_html(&other.as_str().to_uppercase())),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Certificate {number}</title>
  <style>
    @page {{ size: letter landscape; margin: 0; }}
    body {{ margin: 0; font-family: Georgia, 'Times New Roman', serif; width: 11in; height: 8.5in; }}
    .certificate {{ margin: 0.4in; padding: 0.4in; border: 6px double #1f3a5f; text-align: center; }}
    .title {{ font-size: 40px; color: #1f3a5f; margin: 12px 0; }}
    .participant {{ font-size: 32px; border-bottom: 1px solid #999; display: inline-block; padding: 0 40px; }}
    .credits {{ font-size: 24px; font-weight: bold; margin: 18px 0; }}
    .status {{ color: #b00020; font-size: 28px; font-weight: bold; }}
    table {{ margin: 0 auto; text-align: left; font-size: 14px; }}
    td {{ padding: 2px 12px; }}
  </style>
</head>
<body>
  <div class="certificate">
    {status_banner}
    <div>{provider}</div>
    <div class="title">Certificate of Completion</div>
    <div>This certifies that</div>
    <div class="participant">{participant}</div>
    <div>has successfully completed the continuing education event</div>
    <h2>{event_title}</h2>
    <div class="credits">{ceus:.1} CEUs &middot; {category}</div>
    <table>
      <tr><td>Event date:</td><td>{event_date}</td></tr>
      <tr><td>BACB certification number:</td><td>{bacb_id}</td></tr>
      <tr><td>Instructor:</td><td>{instructor}</td></tr>
      <tr><td>ACE provider number:</td><td>{provider_number}</td></tr>
      <tr><td>Issued:</td><td>{issued}</td></tr>
      <tr><td>Certificate number:</td><td>{number}</td></tr>
    </table>
  </div>
</body>
</html>
"#,
        number = escape_html(&certificate.certificate_number),
        status_banner = status_banner,
        provider = escape_html(&certificate.provider_name),
        participant = escape_html(&certificate.participant_name),
        event_title = escape_html(&certificate.event_title),
        ceus = certificate.total_ceus,
        category = escape_html(&certificate.ce_category),
        event_date = escape_html(&certificate.event_date),
        bacb_id = escape_html(bacb_id),
        instructor = escape_html(&certificate.instructor_name),
        provider_number = escape_html(provider_number),
        issued = issued,
    )
}

const CERTIFICATE_NUMBER_CONSTRAINT: &str = "certificates_certificate_number_key";
const CERTIFICATE_NUMBER_ATTEMPTS: u32 = 5;

/// What a status update does to a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Set(CertificateStatus),
    Revoke(String),
}

/// Validate a requested status change; revoked certificates stay revoked
pub fn plan_status_change(current: CertificateStatus, request: &UpdateCertificateRequest) -> Result<StatusChange> {
    let status = request
        .status
        .as_deref()
        .and_then(|raw| raw.parse::<CertificateStatus>().ok())
        .ok_or_else(|| AceError::validation("Invalid status. Must be one of: pending, issued, revoked"))?;

    if current == CertificateStatus::Revoked {
        return Err(AceError::Conflict("Certificate has been revoked".to_string()));
    }

    match status {
        CertificateStatus::Revoked => request
            .revocation_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(|reason| StatusChange::Revoke(reason.to_string()))
            .ok_or_else(|| AceError::validation("Missing required field: revocation_reason")),
        other => Ok(StatusChange::Set(other)),
    }
}

/// Certificate service
#[derive(Clone, Debug)]
pub struct CertificateService {
    db: DatabaseService,
    notifications: NotificationService,
    cache: DashboardCache,
    compliance: ComplianceConfig,
}

impl CertificateService {
    pub fn new(
        db: DatabaseService,
        notifications: NotificationService,
        cache: DashboardCache,
        compliance: ComplianceConfig,
    ) -> Self {
        Self { db, notifications, cache, compliance }
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))
    }

    pub async fn eligibility(&self, event_id: i64, participant_id: i64) -> Result<Eligibility> {
        let event = self.load_event(event_id).await?;
        let registration = self.db.registrations.find_by_event_and_participant(event_id, participant_id).await?;
        Ok(check_eligibility(&event, registration.as_ref()))
    }

    /// Issue a certificate; an existing one for the same participant is returned as is
    pub async fn issue(&self, event_id: i64, participant_id: i64, issued_by: &str) -> Result<Certificate> {
        debug!(event_id, participant_id, "Issuing certificate");

        if let Some(existing) = self.db.certificates.find_by_event_and_participant(event_id, participant_id).await? {
            debug!(certificate_number = %existing.certificate_number, "Certificate already issued");
            return Ok(existing);
        }

        let event = self.load_event(event_id).await?;
        let participant = self
            .db
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or_else(|| AceError::not_found("Participant", participant_id))?;
        let provider = self.db.providers.find_by_id(event.provider_id).await?;

        if let Some(provider) = &provider {
            if !provider.can_issue_certificates {
                warn!(provider_id = provider.id, "Certificate refused, provider cannot issue certificates");
                return Err(AceError::PermissionDenied(
                    "Provider is not authorized to issue certificates".to_string(),
                ));
            }
        }

        let registration = self.db.registrations.find_by_event_and_participant(event_id, participant_id).await?;
        let eligibility = check_eligibility(&event, registration.as_ref());
        if !eligibility.eligible {
            return Err(AceError::Validation {
                message: "Participant is not eligible for a certificate".to_string(),
                errors: eligibility.reasons,
            });
        }

        let now = Utc::now();
        let snapshot = NewCertificate {
            event_id,
            participant_id,
            provider_id: event.provider_id,
            certificate_number: String::new(),
            participant_name: participant.full_name(),
            participant_email: participant.email.clone(),
            participant_bacb_id: participant.bacb_id.clone(),
            event_title: event.title.clone(),
            event_date: event.start_date.format("%Y-%m-%d").to_string(),
            instructor_name: self.compliance.default_instructor_name.clone(),
            provider_name: provider
                .as_ref()
                .map(|p| p.provider_name.clone())
                .unwrap_or_else(|| self.compliance.default_provider_name.clone()),
            provider_number: provider.as_ref().and_then(|p| p.bacb_provider_number.clone()),
            total_ceus: event.total_ceus,
            ce_category: event.ce_category.as_str().to_string(),
            issued_at: now,
        };
        let certificate = self.insert_with_unique_number(snapshot, now).await?;

        self.db
            .registrations
            .update_completion(
                event_id,
                participant_id,
                CompletionUpdate { certificate_issued: Some(true), ..Default::default() },
            )
            .await?;

        self.cache.invalidate(event.provider_id).await;
        log_certificate_action(&certificate.certificate_number, "issued", Some(issued_by));
        self.notifications.send_certificate_issued(&certificate).await;

        Ok(certificate)
    }

    /// Insert under a fresh serial, drawing again when the serial is taken
    async fn insert_with_unique_number(&self, snapshot: NewCertificate, now: DateTime<Utc>) -> Result<Certificate> {
        let mut attempt = 1;
        loop {
            let new = NewCertificate { certificate_number: generate_certificate_number(now), ..snapshot.clone() };
            match self.db.certificates.create(new).await {
                Err(err) if attempt < CERTIFICATE_NUMBER_ATTEMPTS && err.is_duplicate_of(CERTIFICATE_NUMBER_CONSTRAINT) => {
                    warn!(attempt, "Certificate number already taken, drawing another");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub async fn verify(&self, certificate_number: &str) -> Result<CertificateVerification> {
        let certificate = self.db.certificates.find_by_number(certificate_number).await?;
        Ok(verification_for(certificate))
    }

    pub async fn get(&self, id: i64) -> Result<Certificate> {
        self.db
            .certificates
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Certificate", id))
    }

    pub async fn document(&self, id: i64) -> Result<String> {
        let certificate = self.get(id).await?;
        Ok(render_document(&certificate))
    }

    pub async fn revoke(&self, id: i64, reason: &str, revoked_by: &str) -> Result<Certificate> {
        if reason.trim().is_empty() {
            return Err(AceError::validation("Missing required field: reason"));
        }

        let certificate = self.db.certificates.revoke(id, reason, revoked_by, Utc::now()).await?;
        self.cache.invalidate(certificate.provider_id).await;

        log_certificate_action(&certificate.certificate_number, "revoked", Some(reason));
        info!(certificate_id = id, revoked_by = %revoked_by, "Certificate revoked");
        Ok(certificate)
    }

    /// Move a certificate between pending and issued, or revoke it
    pub async fn update_status(&self, id: i64, request: UpdateCertificateRequest, actor: &str) -> Result<Certificate> {
        let current = self.get(id).await?;
        let status = match plan_status_change(current.status, &request)? {
            StatusChange::Revoke(reason) => return self.revoke(id, &reason, actor).await,
            StatusChange::Set(status) => status,
        };

        let certificate = self.db.certificates.update_status(id, status, Utc::now()).await?;
        self.cache.invalidate(certificate.provider_id).await;
        log_certificate_action(&certificate.certificate_number, status.as_str(), Some(actor));
        Ok(certificate)
    }

    pub async fn list(&self, event_id: Option<i64>, participant_id: Option<i64>, provider_id: Option<i64>) -> Result<Vec<Certificate>> {
        match (event_id, participant_id, provider_id) {
            (Some(event_id), _, _) => self.db.certificates.list_by_event(event_id).await,
            (None, Some(participant_id), _) => self.db.certificates.list_by_participant(participant_id).await,
            (None, None, Some(provider_id)) => self.db.certificates.list_by_provider(provider_id).await,
            (None, None, None) => self.db.certificates.list_all(500).await,
        }
    }
}
