//! Participant (platform user) model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    /// Platform role carried in access tokens and on user rows
    UserRole, "role" {
        Participant => "participant",
        Instructor => "instructor",
        CoPresenter => "co_presenter",
        AceCoordinator => "ace_coordinator",
        Admin => "admin",
    }
}

impl UserRole {
    /// Coordinator-level routes accept coordinators and admins
    pub fn is_coordinator(&self) -> bool {
        matches!(self, UserRole::AceCoordinator | UserRole::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bacb_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub credential_type: Option<String>,
    pub credential_number: Option<String>,
    pub credential_expires_at: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParticipantRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bacb_id: Option<String>,
    pub role: Option<UserRole>,
    pub credential_type: Option<String>,
    pub credential_number: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
}
