//! ACE provider model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    ProviderType, "provider type" {
        Individual => "individual",
        Organization => "organization",
    }
}

text_enum! {
    /// Fee kinds recorded against a provider
    PaymentType, "payment type" {
        Application => "application",
        Renewal => "renewal",
        Late => "late",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub id: i64,
    pub provider_name: String,
    #[sqlx(try_from = "String")]
    pub provider_type: ProviderType,
    pub bacb_provider_number: Option<String>,
    pub coordinator_id: i64,
    pub coordinator_years_certified: i32,
    pub coordinator_certification_date: Option<DateTime<Utc>>,
    pub coordinator_certification_expires: Option<DateTime<Utc>>,
    pub coordinator_certification_verified: bool,
    pub primary_email: String,
    pub primary_phone: Option<String>,
    pub website: Option<String>,
    pub application_date: Option<DateTime<Utc>>,
    pub approval_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub application_fee_paid: bool,
    pub application_fee_amount: Option<f64>,
    pub application_fee_paid_date: Option<DateTime<Utc>>,
    pub renewal_fee_paid: bool,
    pub last_renewal_date: Option<DateTime<Utc>>,
    pub next_renewal_date: Option<DateTime<Utc>>,
    pub grace_period_end_date: Option<DateTime<Utc>>,
    pub late_fee_paid: bool,
    pub late_fee_amount: Option<f64>,
    pub late_fee_paid_date: Option<DateTime<Utc>>,
    pub can_publish_events: bool,
    pub can_issue_certificates: bool,
    pub ein: Option<String>,
    pub legal_entity_verified: bool,
    pub legal_entity_verified_at: Option<DateTime<Utc>>,
    pub leadership_attestation_url: Option<String>,
    pub leadership_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn is_organization(&self) -> bool {
        self.provider_type == ProviderType::Organization
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderRequest {
    pub provider_name: String,
    pub provider_type: ProviderType,
    pub coordinator_id: i64,
    pub coordinator_years_certified: i32,
    pub coordinator_certification_date: Option<DateTime<Utc>>,
    pub coordinator_certification_expires: Option<DateTime<Utc>>,
    pub primary_email: String,
    pub primary_phone: Option<String>,
    pub website: Option<String>,
    pub ein: Option<String>,
    pub leadership_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProviderRequest {
    pub provider_name: Option<String>,
    pub bacb_provider_number: Option<String>,
    pub coordinator_certification_expires: Option<DateTime<Utc>>,
    pub coordinator_certification_verified: Option<bool>,
    pub primary_email: Option<String>,
    pub primary_phone: Option<String>,
    pub website: Option<String>,
    pub grace_period_end_date: Option<DateTime<Utc>>,
    pub legal_entity_verified: Option<bool>,
    pub leadership_attestation_url: Option<String>,
    pub leadership_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub payment_type: PaymentType,
    pub amount: Option<f64>,
}

/// Aggregate counts shown on the coordinator dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub total_events: usize,
    pub active_events: usize,
    pub total_registrations: usize,
    pub total_certificates: usize,
    pub total_ceus_issued: f64,
}
