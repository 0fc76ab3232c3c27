//! Complaint model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    ComplaintStatus, "complaint status" {
        Submitted => "submitted",
        UnderReview => "under_review",
        Resolved => "resolved",
        EscalatedToBacb => "escalated_to_bacb",
    }
}

impl ComplaintStatus {
    /// Resolved and escalated complaints no longer count toward deadlines
    pub fn is_closed(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::EscalatedToBacb)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    pub id: i64,
    pub provider_id: i64,
    pub event_id: Option<i64>,
    pub submitter_name: String,
    pub submitter_email: String,
    pub submitter_bacb_id: Option<String>,
    pub submitter_phone: Option<String>,
    pub complaint_text: String,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitComplaintRequest {
    pub provider_id: Option<i64>,
    pub event_id: Option<i64>,
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    pub submitter_bacb_id: Option<String>,
    pub submitter_phone: Option<String>,
    pub complaint_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateComplaintRequest {
    pub status: Option<String>,
    pub resolution_notes: Option<String>,
}
