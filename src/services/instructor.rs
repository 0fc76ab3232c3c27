//! Instructor qualification service implementation

use chrono::Utc;
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::{InstructorQualification, SubmitQualificationRequest, UserRole};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::logging::log_admin_action;

/// Role a user holds after filing a qualification
pub fn promoted_role(current: UserRole) -> UserRole {
    match current {
        UserRole::Instructor | UserRole::AceCoordinator | UserRole::Admin => current,
        UserRole::Participant | UserRole::CoPresenter => UserRole::Instructor,
    }
}

/// Rejections must explain themselves
pub fn rejection_notes(notes: Option<String>) -> Result<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AceError::validation("Review notes are required when rejecting a qualification"))
}

#[derive(Clone, Debug)]
pub struct InstructorService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl InstructorService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// File a qualification for review and make the user an instructor
    pub async fn submit(&self, request: SubmitQualificationRequest) -> Result<InstructorQualification> {
        let provider_id = request
            .provider_id
            .ok_or_else(|| AceError::validation("Missing required field: provider_id"))?;
        let user_id = request
            .user_id
            .ok_or_else(|| AceError::validation("Missing required field: user_id"))?;
        debug!(user_id, provider_id, "Submitting instructor qualification");

        if self.db.providers.find_by_id(provider_id).await?.is_none() {
            return Err(AceError::not_found("Provider", provider_id));
        }
        let user = self
            .db
            .participants
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AceError::not_found("Participant", user_id))?;

        let qualification = self.db.instructors.create(user_id, provider_id, request).await?;

        let role = promoted_role(user.role);
        if role != user.role {
            self.db.participants.set_role(user_id, role).await?;
        }
        self.cache.invalidate(provider_id).await;

        info!(qualification_id = qualification.id, user_id, provider_id, "Instructor qualification submitted");
        Ok(qualification)
    }

    pub async fn approve(&self, id: i64, notes: Option<String>, reviewer: &str) -> Result<InstructorQualification> {
        let qualification = self.db.instructors.review(id, true, notes, reviewer, Utc::now()).await?;
        self.cache.invalidate(qualification.provider_id).await;
        log_admin_action(reviewer, "approve_instructor", Some(&id.to_string()), None);
        Ok(qualification)
    }

    pub async fn reject(&self, id: i64, notes: Option<String>, reviewer: &str) -> Result<InstructorQualification> {
        let notes = rejection_notes(notes)?;
        let qualification = self
            .db
            .instructors
            .review(id, false, Some(notes.clone()), reviewer, Utc::now())
            .await?;
        self.cache.invalidate(qualification.provider_id).await;
        log_admin_action(reviewer, "reject_instructor", Some(&id.to_string()), Some(&notes));
        Ok(qualification)
    }

    pub async fn list(&self, provider_id: Option<i64>, user_id: Option<i64>) -> Result<Vec<InstructorQualification>> {
        if provider_id.is_none() && user_id.is_none() {
            return Err(AceError::validation("Please provide provider_id or user_id parameter"));
        }
        self.db.instructors.list(provider_id, user_id).await
    }

    pub async fn pending(&self) -> Result<Vec<InstructorQualification>> {
        self.db.instructors.list_pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promoted_role() {
        assert_eq!(promoted_role(UserRole::Participant), UserRole::Instructor);
        assert_eq!(promoted_role(UserRole::CoPresenter), UserRole::Instructor);
        assert_eq!(promoted_role(UserRole::Admin), UserRole::Admin);
        assert_eq!(promoted_role(UserRole::AceCoordinator), UserRole::AceCoordinator);
    }

    #[test]
    fn test_rejection_requires_notes() {
        assert!(rejection_notes(None).is_err());
        assert!(rejection_notes(Some("   ".to_string())).is_err());
        assert_eq!(rejection_notes(Some(" Expired BCBA ".to_string())).unwrap(), "Expired BCBA");
    }
}
