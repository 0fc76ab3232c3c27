//! Feedback repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::feedback::{FeedbackResponse, ReviewFeedbackRequest};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct FeedbackRepository {
    pool: PgPool,
}

/// Validated feedback values ready to insert
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub event_id: i64,
    pub participant_id: i64,
    pub ratings: [i32; 4],
    pub comments: Option<String>,
    pub suggestions: Option<String>,
    pub would_recommend: Option<bool>,
    pub application_plan: Option<String>,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewFeedback) -> Result<FeedbackResponse, AceError> {
        let [rating, instructor_rating, content_rating, relevance_rating] = new.ratings;
        let feedback = sqlx::query_as::<_, FeedbackResponse>(
            r#"
            INSERT INTO feedback_responses (event_id, participant_id, rating, instructor_rating, content_rating,
                relevance_rating, comments, suggestions, would_recommend, application_plan, submitted_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#
        )
        .bind(new.event_id)
        .bind(new.participant_id)
        .bind(rating)
        .bind(instructor_rating)
        .bind(content_rating)
        .bind(relevance_rating)
        .bind(new.comments)
        .bind(new.suggestions)
        .bind(new.would_recommend)
        .bind(new.application_plan)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FeedbackResponse>, AceError> {
        let feedback = sqlx::query_as::<_, FeedbackResponse>(
            "SELECT * FROM feedback_responses WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }

    pub async fn find_by_event_and_participant(&self, event_id: i64, participant_id: i64) -> Result<Option<FeedbackResponse>, AceError> {
        let feedback = sqlx::query_as::<_, FeedbackResponse>(
            "SELECT * FROM feedback_responses WHERE event_id = $1 AND participant_id = $2"
        )
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }

    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<FeedbackResponse>, AceError> {
        self.list_by_events(&[event_id]).await
    }

    pub async fn list_by_events(&self, event_ids: &[i64]) -> Result<Vec<FeedbackResponse>, AceError> {
        let feedback = sqlx::query_as::<_, FeedbackResponse>(
            "SELECT * FROM feedback_responses WHERE event_id = ANY($1) ORDER BY submitted_at DESC"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Record the coordinator's review
    pub async fn review(&self, id: i64, request: ReviewFeedbackRequest, now: DateTime<Utc>) -> Result<FeedbackResponse, AceError> {
        let feedback = sqlx::query_as::<_, FeedbackResponse>(
            r#"
            UPDATE feedback_responses
            SET coordinator_reviewed_at = $2, coordinator_notes = $3, coordinator_action = $4
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(now)
        .bind(request.notes)
        .bind(request.action)
        .fetch_optional(&self.pool)
        .await?;

        feedback.ok_or_else(|| AceError::not_found("Feedback", id))
    }
}
