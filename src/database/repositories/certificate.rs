//! Certificate repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::certificate::{Certificate, CertificateStatus};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct CertificateRepository {
    pool: PgPool,
}

/// Snapshot written when a certificate is issued
#[derive(Debug, Clone)]
pub struct NewCertificate {
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
    pub issued_at: DateTime<Utc>,
}

impl CertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an issued certificate
    pub async fn create(&self, new: NewCertificate) -> Result<Certificate, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (event_id, participant_id, provider_id, certificate_number, participant_name,
                participant_email, participant_bacb_id, event_title, event_date, instructor_name, provider_name,
                provider_number, total_ceus, ce_category, status, issued_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'issued', $15, $15)
            RETURNING *
            "#
        )
        .bind(new.event_id)
        .bind(new.participant_id)
        .bind(new.provider_id)
        .bind(new.certificate_number)
        .bind(new.participant_name)
        .bind(new.participant_email)
        .bind(new.participant_bacb_id)
        .bind(new.event_title)
        .bind(new.event_date)
        .bind(new.instructor_name)
        .bind(new.provider_name)
        .bind(new.provider_number)
        .bind(new.total_ceus)
        .bind(new.ce_category)
        .bind(new.issued_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Find certificate by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Certificate>, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Find certificate by its public number
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Certificate>, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE certificate_number = $1"
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Find certificate for an event and participant
    pub async fn find_by_event_and_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<Certificate>, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    /// Certificates for an event
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Certificate>, AceError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE event_id = $1 ORDER BY created_at DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// Certificates of a participant
    pub async fn list_by_participant(&self, participant_id: i64) -> Result<Vec<Certificate>, AceError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE participant_id = $1 ORDER BY created_at DESC"
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// Certificates of a provider
    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Certificate>, AceError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE provider_id = $1 ORDER BY created_at DESC"
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// Every certificate, newest first
    pub async fn list_all(&self, limit: i64) -> Result<Vec<Certificate>, AceError> {
        let certificates = sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates ORDER BY created_at DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    /// Revoke a certificate
    pub async fn revoke(&self, id: i64, reason: &str, revoked_by: &str, now: DateTime<Utc>) -> Result<Certificate, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            UPDATE certificates
            SET status = 'revoked', revoked_at = $2, revoked_by = $3, revocation_reason = $4
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(now)
        .bind(revoked_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        certificate.ok_or_else(|| AceError::not_found("Certificate", id))
    }

    /// Set status, stamping issue or revocation time
    pub async fn update_status(&self, id: i64, status: CertificateStatus, now: DateTime<Utc>) -> Result<Certificate, AceError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            UPDATE certificates
            SET status = $2,
                issued_at = CASE WHEN $2 = 'issued' THEN $3 ELSE issued_at END,
                revoked_at = CASE WHEN $2 = 'revoked' THEN $3 ELSE revoked_at END
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        certificate.ok_or_else(|| AceError::not_found("Certificate", id))
    }
}
