//! Attendance repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::attendance::AttendanceRecord;
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the first record for a participant; verified attendance log entry
    pub async fn create_sign_in(&self, event_id: i64, participant_id: i64, code: Option<String>, now: DateTime<Utc>) -> Result<AttendanceRecord, AceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (event_id, participant_id, verification_method, verified, verified_at,
                sign_in_timestamp, verification_code_entered, verification_code_timestamp, created_at, updated_at)
            VALUES ($1, $2, 'attendance_log', TRUE, $3, $3, $4, CASE WHEN $4::TEXT IS NULL THEN NULL ELSE $3 END, $3, $3)
            RETURNING *
            "#
        )
        .bind(event_id)
        .bind(participant_id)
        .bind(now)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Stamp the sign-out time
    pub async fn record_sign_out(&self, id: i64, now: DateTime<Utc>) -> Result<AttendanceRecord, AceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "UPDATE attendance_records SET sign_out_timestamp = $2, updated_at = $2 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| AceError::not_found("Attendance record", id))
    }

    /// Store an entered verification code
    pub async fn record_code(&self, id: i64, code: &str, now: DateTime<Utc>) -> Result<AttendanceRecord, AceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_records
            SET verification_code_entered = $2, verification_code_timestamp = $3, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| AceError::not_found("Attendance record", id))
    }

    /// Coordinator verification
    pub async fn set_verified(&self, id: i64, verified: bool, verified_by: &str, now: DateTime<Utc>) -> Result<AttendanceRecord, AceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_records
            SET verified = $2, verified_by = $3, verified_at = $4, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(verified)
        .bind(verified_by)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| AceError::not_found("Attendance record", id))
    }

    /// Find record for an event and participant
    pub async fn find_by_event_and_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<AttendanceRecord>, AceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Records for any of the given events
    pub async fn list_by_events(&self, event_ids: &[i64]) -> Result<Vec<AttendanceRecord>, AceError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE event_id = ANY($1) ORDER BY sign_in_timestamp ASC NULLS LAST"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Records of a participant across events
    pub async fn list_by_participant(&self, participant_id: i64) -> Result<Vec<AttendanceRecord>, AceError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE participant_id = $1 ORDER BY created_at DESC"
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
