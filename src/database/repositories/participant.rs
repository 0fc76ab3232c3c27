//! Participant repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::participant::{Participant, CreateParticipantRequest, UserRole};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new participant
    pub async fn create(&self, request: CreateParticipantRequest) -> Result<Participant, AceError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (email, first_name, last_name, bacb_id, role, credential_type, credential_number, phone, organization, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#
        )
        .bind(request.email.to_lowercase())
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.bacb_id)
        .bind(request.role.unwrap_or(UserRole::Participant).as_str())
        .bind(request.credential_type)
        .bind(request.credential_number)
        .bind(request.phone)
        .bind(request.organization)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find participant by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Participant>, AceError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find several participants at once
    pub async fn find_many(&self, ids: &[i64]) -> Result<Vec<Participant>, AceError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE id = ANY($1)"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Change a participant's role
    pub async fn set_role(&self, id: i64, role: UserRole) -> Result<Participant, AceError> {
        let participant = sqlx::query_as::<_, Participant>(
            "UPDATE participants SET role = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        participant.ok_or_else(|| AceError::not_found("Participant", id))
    }
}
