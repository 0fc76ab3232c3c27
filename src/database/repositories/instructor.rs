//! Instructor qualification repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::instructor::{InstructorQualification, SubmitQualificationRequest};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct InstructorRepository {
    pool: PgPool,
}

impl InstructorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a submitted qualification awaiting review
    pub async fn create(&self, user_id: i64, provider_id: i64, request: SubmitQualificationRequest) -> Result<InstructorQualification, AceError> {
        let qualification = sqlx::query_as::<_, InstructorQualification>(
            r#"
            INSERT INTO instructor_qualifications (user_id, provider_id, is_bcba, is_bcba_d, is_phd_aba,
                certification_number, certification_date, certification_expiration, cv_url, certification_proof_url,
                qualification_path, expertise_basis, years_experience_in_subject, years_teaching_subject,
                is_approved, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE, $15, $15)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(provider_id)
        .bind(request.is_bcba)
        .bind(request.is_bcba_d)
        .bind(request.is_phd_aba)
        .bind(request.certification_number)
        .bind(request.certification_date)
        .bind(request.certification_expiration)
        .bind(request.cv_url)
        .bind(request.certification_proof_url)
        .bind(request.qualification_path.map(|p| p.as_str()))
        .bind(request.expertise_basis.map(|b| b.as_str()))
        .bind(request.years_experience_in_subject)
        .bind(request.years_teaching_subject)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(qualification)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<InstructorQualification>, AceError> {
        let qualification = sqlx::query_as::<_, InstructorQualification>(
            "SELECT * FROM instructor_qualifications WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(qualification)
    }

    /// Qualifications filtered by provider and/or user, newest first
    pub async fn list(&self, provider_id: Option<i64>, user_id: Option<i64>) -> Result<Vec<InstructorQualification>, AceError> {
        let qualifications = sqlx::query_as::<_, InstructorQualification>(
            r#"
            SELECT * FROM instructor_qualifications
            WHERE ($1::BIGINT IS NULL OR provider_id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            "#
        )
        .bind(provider_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(qualifications)
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<InstructorQualification>, AceError> {
        self.list(Some(provider_id), None).await
    }

    /// Qualifications not yet reviewed, oldest first
    pub async fn list_pending(&self) -> Result<Vec<InstructorQualification>, AceError> {
        let qualifications = sqlx::query_as::<_, InstructorQualification>(
            "SELECT * FROM instructor_qualifications WHERE is_approved = FALSE AND verified_at IS NULL ORDER BY created_at ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(qualifications)
    }

    /// Record a review decision
    pub async fn review(&self, id: i64, approved: bool, notes: Option<String>, reviewer: &str, now: DateTime<Utc>) -> Result<InstructorQualification, AceError> {
        let qualification = sqlx::query_as::<_, InstructorQualification>(
            r#"
            UPDATE instructor_qualifications
            SET is_approved = $2, qualification_review_notes = $3, verified_by = $4, verified_at = $5, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(approved)
        .bind(notes)
        .bind(reviewer)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        qualification.ok_or_else(|| AceError::not_found("Instructor qualification", id))
    }
}
