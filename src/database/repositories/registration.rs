//! Registration repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::registration::{Registration, RegistrationStatus, CompletionUpdate};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

/// Values for a new registration row
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub event_id: i64,
    pub participant_id: i64,
    pub confirmation_code: String,
    pub status: RegistrationStatus,
    pub fee_amount: Option<f64>,
    pub fee_paid: bool,
    pub credential_type: Option<String>,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a registration
    pub async fn create(&self, new: NewRegistration) -> Result<Registration, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (event_id, participant_id, confirmation_code, status, fee_amount, fee_paid, credential_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#
        )
        .bind(new.event_id)
        .bind(new.participant_id)
        .bind(new.confirmation_code)
        .bind(new.status.as_str())
        .bind(new.fee_amount)
        .bind(new.fee_paid)
        .bind(new.credential_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration for an event and participant
    pub async fn find_by_event_and_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<Registration>, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by confirmation code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Registration>, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE confirmation_code = $1"
        )
        .bind(code.to_uppercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Registrations for an event
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Registration>, AceError> {
        self.list_by_events(&[event_id]).await
    }

    /// Registrations for any of the given events
    pub async fn list_by_events(&self, event_ids: &[i64]) -> Result<Vec<Registration>, AceError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = ANY($1) ORDER BY created_at ASC"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Registrations of a participant
    pub async fn list_by_participant(&self, participant_id: i64) -> Result<Vec<Registration>, AceError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE participant_id = $1 ORDER BY created_at DESC"
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Update registration status
    pub async fn update_status(&self, id: i64, status: RegistrationStatus) -> Result<Registration, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        registration.ok_or_else(|| AceError::not_found("Registration", id))
    }

    /// Mark a paid registration confirmed
    pub async fn mark_payment_complete(&self, id: i64, paid_at: DateTime<Utc>) -> Result<Registration, AceError> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET fee_paid = TRUE, payment_date = $2, status = 'confirmed', updated_at = $2
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(paid_at)
        .fetch_optional(&self.pool)
        .await?;

        registration.ok_or_else(|| AceError::not_found("Registration", id))
    }

    /// Set completion flags for an event and participant; no-op when not registered
    pub async fn update_completion(&self, event_id: i64, participant_id: i64, update: CompletionUpdate) -> Result<(), AceError> {
        sqlx::query(
            r#"
            UPDATE registrations
            SET attendance_verified = COALESCE($3, attendance_verified),
                quiz_completed = COALESCE($4, quiz_completed),
                feedback_completed = COALESCE($5, feedback_completed),
                certificate_issued = COALESCE($6, certificate_issued),
                updated_at = $7
            WHERE event_id = $1 AND participant_id = $2
            "#
        )
        .bind(event_id)
        .bind(participant_id)
        .bind(update.attendance_verified)
        .bind(update.quiz_completed)
        .bind(update.feedback_completed)
        .bind(update.certificate_issued)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
