//! Registration model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    RegistrationStatus, "registration status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
        Completed => "completed",
        Waitlisted => "waitlisted",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    pub confirmation_code: String,
    #[sqlx(try_from = "String")]
    pub status: RegistrationStatus,
    pub fee_amount: Option<f64>,
    pub fee_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub credential_type: Option<String>,
    pub attendance_verified: bool,
    pub quiz_completed: bool,
    pub feedback_completed: bool,
    pub certificate_issued: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub credential_type: Option<String>,
}

/// Partial update of the completion flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionUpdate {
    pub attendance_verified: Option<bool>,
    pub quiz_completed: Option<bool>,
    pub feedback_completed: Option<bool>,
    pub certificate_issued: Option<bool>,
}
