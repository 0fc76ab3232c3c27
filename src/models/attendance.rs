//! Attendance record model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;
use super::event::VerificationMethod;

text_enum! {
    AttendanceAction, "action" {
        CheckIn => "check_in",
        CheckOut => "check_out",
        VerifyCode => "verify_code",
    }
}

impl AttendanceAction {
    pub fn success_message(&self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "Successfully checked in",
            AttendanceAction::CheckOut => "Successfully checked out",
            AttendanceAction::VerifyCode => "Verification code recorded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    #[sqlx(try_from = "String")]
    pub verification_method: VerificationMethod,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub sign_in_timestamp: Option<DateTime<Utc>>,
    pub sign_out_timestamp: Option<DateTime<Utc>>,
    pub verification_code_entered: Option<String>,
    pub verification_code_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAttendanceRequest {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub action: Option<String>,
    pub verification_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyAttendanceRequest {
    pub verified: bool,
}
