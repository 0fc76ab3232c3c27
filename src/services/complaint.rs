//! Complaint service implementation
//!
//! Complaints must be answered within 45 days of submission. Views returned
//! to coordinators carry the due date and overdue flag.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::compliance::deadlines::{complaint_deadline, complaint_view, ComplaintView};
use crate::database::repositories::NewComplaint;
use crate::database::DatabaseService;
use crate::models::{Complaint, ComplaintStatus, SubmitComplaintRequest, UpdateComplaintRequest};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::helpers::is_valid_email;
use crate::utils::logging::log_admin_action;

pub const SUBMITTED_MESSAGE: &str =
    "Your complaint has been submitted successfully. You will receive a response within 45 days.";

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Check a public complaint submission
pub fn validate_submission(request: SubmitComplaintRequest) -> Result<NewComplaint> {
    let missing = || AceError::validation("Missing required fields: provider_id, submitter_name, submitter_email, complaint_text");

    let provider_id = request.provider_id.ok_or_else(missing)?;
    let submitter_name = non_blank(request.submitter_name).ok_or_else(missing)?;
    let submitter_email = non_blank(request.submitter_email).ok_or_else(missing)?;
    let complaint_text = non_blank(request.complaint_text).ok_or_else(missing)?;

    if !is_valid_email(&submitter_email) {
        return Err(AceError::validation("Invalid email format"));
    }

    Ok(NewComplaint {
        provider_id,
        event_id: request.event_id,
        submitter_name,
        submitter_email,
        submitter_bacb_id: non_blank(request.submitter_bacb_id),
        submitter_phone: non_blank(request.submitter_phone),
        complaint_text,
    })
}

/// Parse the requested status of a complaint update
pub fn parse_status(raw: Option<&str>) -> Result<ComplaintStatus> {
    raw.and_then(|s| s.parse::<ComplaintStatus>().ok())
        .ok_or_else(|| AceError::validation("Invalid status value"))
}

/// Complaint service
#[derive(Clone, Debug)]
pub struct ComplaintService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl ComplaintService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// Record a complaint and return it with its response deadline
    pub async fn submit(&self, request: SubmitComplaintRequest) -> Result<(Complaint, DateTime<Utc>)> {
        let new = validate_submission(request)?;
        debug!(provider_id = new.provider_id, "Submitting complaint");

        if self.db.providers.find_by_id(new.provider_id).await?.is_none() {
            return Err(AceError::not_found("Provider", new.provider_id));
        }

        let complaint = self.db.complaints.create(new, Utc::now()).await?;
        let due = complaint_deadline(&complaint);
        self.cache.invalidate(complaint.provider_id).await;

        info!(complaint_id = complaint.id, provider_id = complaint.provider_id, due = %due, "Complaint submitted");
        Ok((complaint, due))
    }

    pub async fn update_status(&self, id: i64, request: UpdateComplaintRequest, actor: &str) -> Result<ComplaintView> {
        let status = parse_status(request.status.as_deref())?;
        let complaint = self
            .db
            .complaints
            .update_status(id, status, request.resolution_notes, actor, Utc::now())
            .await?;

        self.cache.invalidate(complaint.provider_id).await;
        log_admin_action(actor, "complaint_status", Some(&id.to_string()), Some(status.as_str()));

        Ok(complaint_view(complaint, Utc::now()))
    }

    pub async fn list(&self, provider_id: Option<i64>, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintView>> {
        let now = Utc::now();
        let complaints = self.db.complaints.list(provider_id, status).await?;
        Ok(complaints.into_iter().map(|c| complaint_view(c, now)).collect())
    }

    pub async fn get(&self, id: i64) -> Result<ComplaintView> {
        let complaint = self
            .db
            .complaints
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Complaint", id))?;
        Ok(complaint_view(complaint, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmitComplaintRequest {
        SubmitComplaintRequest {
            provider_id: Some(1),
            event_id: None,
            submitter_name: Some("Jordan Lee".to_string()),
            submitter_email: Some("jordan@example.com".to_string()),
            submitter_bacb_id: Some("".to_string()),
            submitter_phone: None,
            complaint_text: Some("The certificate never arrived.".to_string()),
        }
    }

    #[test]
    fn test_valid_submission_drops_blank_optionals() {
        let new = validate_submission(request()).unwrap();
        assert_eq!(new.provider_id, 1);
        assert_eq!(new.submitter_bacb_id, None);
    }

    #[test]
    fn test_missing_fields() {
        let mut blank_text = request();
        blank_text.complaint_text = Some("   ".to_string());
        let err = validate_submission(blank_text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: provider_id, submitter_name, submitter_email, complaint_text"
        );
    }

    #[test]
    fn test_invalid_email() {
        let mut bad = request();
        bad.submitter_email = Some("jordan-at-example".to_string());
        assert_eq!(validate_submission(bad).unwrap_err().to_string(), "Invalid email format");
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("escalated_to_bacb")).unwrap(), ComplaintStatus::EscalatedToBacb);
        assert_eq!(parse_status(Some("closed")).unwrap_err().to_string(), "Invalid status value");
        assert!(parse_status(None).is_err());
    }
}
