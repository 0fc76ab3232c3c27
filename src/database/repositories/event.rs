//! Event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::event::{
    Event, EventStatus, EventFilter, EventInstructor, InstructorRole, CreateEventRequest,
    UpdateEventRequest, EventType, EventSubtype, VerificationMethod,
};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new draft event
    pub async fn create(&self, request: CreateEventRequest, minimum_questions: Option<i32>) -> Result<Event, AceError> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (provider_id, title, description, total_ceus, ce_category, modality, event_type,
                event_subtype, start_date, end_date, registration_deadline, max_participants, current_participants,
                location, online_meeting_url, fee, verification_method, passing_score_percentage, status,
                minimum_questions_required, actual_questions_count, learning_objectives,
                instructor_qualifications_summary, instructor_affiliations, conflicts_of_interest, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0, $13, $14, $15, $16, $17, 'draft',
                $18, 0, $19, $20, $21, $22, $23, $23)
            RETURNING *
            "#
        )
        .bind(request.provider_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.total_ceus)
        .bind(request.ce_category.as_str())
        .bind(request.modality.as_str())
        .bind(request.event_type.unwrap_or(EventType::Ce).as_str())
        .bind(request.event_subtype.unwrap_or(EventSubtype::Standard).as_str())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.registration_deadline)
        .bind(request.max_participants)
        .bind(request.location)
        .bind(request.online_meeting_url)
        .bind(request.fee)
        .bind(request.verification_method.unwrap_or(VerificationMethod::AttendanceLog).as_str())
        .bind(request.passing_score_percentage)
        .bind(minimum_questions)
        .bind(request.learning_objectives)
        .bind(request.instructor_qualifications_summary)
        .bind(request.instructor_affiliations)
        .bind(request.conflicts_of_interest)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AceError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event; absent fields keep their values
    pub async fn update(&self, id: i64, request: UpdateEventRequest, minimum_questions: Option<i32>) -> Result<Event, AceError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                total_ceus = COALESCE($4, total_ceus),
                ce_category = COALESCE($5, ce_category),
                modality = COALESCE($6, modality),
                event_subtype = COALESCE($7, event_subtype),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date),
                registration_deadline = COALESCE($10, registration_deadline),
                max_participants = COALESCE($11, max_participants),
                location = COALESCE($12, location),
                online_meeting_url = COALESCE($13, online_meeting_url),
                fee = COALESCE($14, fee),
                verification_method = COALESCE($15, verification_method),
                passing_score_percentage = COALESCE($16, passing_score_percentage),
                learning_objectives = COALESCE($17, learning_objectives),
                instructor_qualifications_summary = COALESCE($18, instructor_qualifications_summary),
                instructor_affiliations = COALESCE($19, instructor_affiliations),
                conflicts_of_interest = COALESCE($20, conflicts_of_interest),
                minimum_questions_required = COALESCE($21, minimum_questions_required),
                updated_at = $22
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.total_ceus)
        .bind(request.ce_category.map(|c| c.as_str()))
        .bind(request.modality.map(|m| m.as_str()))
        .bind(request.event_subtype.map(|s| s.as_str()))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.registration_deadline)
        .bind(request.max_participants)
        .bind(request.location)
        .bind(request.online_meeting_url)
        .bind(request.fee)
        .bind(request.verification_method.map(|v| v.as_str()))
        .bind(request.passing_score_percentage)
        .bind(request.learning_objectives)
        .bind(request.instructor_qualifications_summary)
        .bind(request.instructor_affiliations)
        .bind(request.conflicts_of_interest)
        .bind(minimum_questions)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or_else(|| AceError::not_found("Event", id))
    }

    /// Write a new status
    pub async fn update_status(&self, id: i64, status: EventStatus) -> Result<Event, AceError> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or_else(|| AceError::not_found("Event", id))
    }

    /// Approved and in-progress events, soonest first
    pub async fn list_public(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>, AceError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status IN ('approved', 'in_progress')
              AND ($1::TEXT IS NULL OR ce_category = $1)
              AND ($2::TEXT IS NULL OR modality = $2)
              AND ($3 = FALSE OR start_date >= $4)
            ORDER BY start_date ASC
            "#
        )
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.modality.map(|m| m.as_str()))
        .bind(filter.upcoming)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// All events of a provider, newest first
    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Event>, AceError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE provider_id = $1 ORDER BY start_date DESC"
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Add one to the participant count
    pub async fn increment_participants(&self, id: i64) -> Result<(), AceError> {
        sqlx::query("UPDATE events SET current_participants = current_participants + 1, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove one from the participant count, never below zero
    pub async fn decrement_participants(&self, id: i64) -> Result<(), AceError> {
        sqlx::query("UPDATE events SET current_participants = GREATEST(current_participants - 1, 0), updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Overwrite the stored count of active quiz questions
    pub async fn set_actual_questions_count(&self, id: i64, count: i32) -> Result<(), AceError> {
        sqlx::query("UPDATE events SET actual_questions_count = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(count)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Assign an instructor to an event
    pub async fn add_instructor(&self, event_id: i64, user_id: i64, role: InstructorRole) -> Result<EventInstructor, AceError> {
        let instructor = sqlx::query_as::<_, EventInstructor>(
            r#"
            INSERT INTO event_instructors (event_id, user_id, role, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id, user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(instructor)
    }

    /// Instructors assigned to any of the given events
    pub async fn instructors_for_events(&self, event_ids: &[i64]) -> Result<Vec<EventInstructor>, AceError> {
        let instructors = sqlx::query_as::<_, EventInstructor>(
            "SELECT * FROM event_instructors WHERE event_id = ANY($1) ORDER BY created_at ASC"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(instructors)
    }
}
