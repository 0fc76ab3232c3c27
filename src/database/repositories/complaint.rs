//! Complaint repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::complaint::{Complaint, ComplaintStatus};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ComplaintRepository {
    pool: PgPool,
}

/// Validated complaint ready to insert
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub provider_id: i64,
    pub event_id: Option<i64>,
    pub submitter_name: String,
    pub submitter_email: String,
    pub submitter_bacb_id: Option<String>,
    pub submitter_phone: Option<String>,
    pub complaint_text: String,
}

impl ComplaintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewComplaint, now: DateTime<Utc>) -> Result<Complaint, AceError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (provider_id, event_id, submitter_name, submitter_email, submitter_bacb_id,
                submitter_phone, complaint_text, status, submitted_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'submitted', $8, $8, $8)
            RETURNING *
            "#
        )
        .bind(new.provider_id)
        .bind(new.event_id)
        .bind(new.submitter_name)
        .bind(new.submitter_email)
        .bind(new.submitter_bacb_id)
        .bind(new.submitter_phone)
        .bind(new.complaint_text)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(complaint)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Complaint>, AceError> {
        let complaint = sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(complaint)
    }

    /// Complaints filtered by provider and status, oldest first
    pub async fn list(&self, provider_id: Option<i64>, status: Option<ComplaintStatus>) -> Result<Vec<Complaint>, AceError> {
        let complaints = sqlx::query_as::<_, Complaint>(
            r#"
            SELECT * FROM complaints
            WHERE ($1::BIGINT IS NULL OR provider_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY submitted_at ASC
            "#
        )
        .bind(provider_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(complaints)
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Complaint>, AceError> {
        self.list(Some(provider_id), None).await
    }

    /// Move a complaint to a new status; closing statuses stamp resolution
    pub async fn update_status(
        &self,
        id: i64,
        status: ComplaintStatus,
        resolution_notes: Option<String>,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Complaint, AceError> {
        let closing = status.is_closed();
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = $2,
                resolution_notes = COALESCE($3, resolution_notes),
                resolved_at = CASE WHEN $4 THEN $6 ELSE resolved_at END,
                resolved_by = CASE WHEN $4 THEN $5 ELSE resolved_by END,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(status.as_str())
        .bind(resolution_notes)
        .bind(closing)
        .bind(resolved_by)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        complaint.ok_or_else(|| AceError::not_found("Complaint", id))
    }
}
