//! Certificate model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    CertificateStatus, "certificate status" {
        Pending => "pending",
        Issued => "issued",
        Revoked => "revoked",
    }
}

/// Issued certificate with a snapshot of the participant, event and provider
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    pub provider_id: i64,
    pub certificate_number: String,
    pub participant_name: String,
    pub participant_email: String,
    pub participant_bacb_id: Option<String>,
    pub event_title: String,
    pub event_date: String,
    pub instructor_name: String,
    pub provider_name: String,
    pub provider_number: Option<String>,
    pub total_ceus: f64,
    pub ce_category: String,
    #[sqlx(try_from = "String")]
    pub status: CertificateStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
    pub revocation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCertificateRequest {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeCertificateRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCertificateRequest {
    pub status: Option<String>,
    pub revocation_reason: Option<String>,
}
