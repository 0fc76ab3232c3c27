//! Feedback response model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackResponse {
    pub id: i64,
    pub event_id: i64,
    pub participant_id: i64,
    pub rating: i32,
    pub instructor_rating: i32,
    pub content_rating: i32,
    pub relevance_rating: i32,
    pub comments: Option<String>,
    pub suggestions: Option<String>,
    pub would_recommend: Option<bool>,
    pub application_plan: Option<String>,
    pub coordinator_reviewed_at: Option<DateTime<Utc>>,
    pub coordinator_notes: Option<String>,
    pub coordinator_action: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackResponse {
    pub fn is_reviewed(&self) -> bool {
        self.coordinator_reviewed_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub event_id: Option<i64>,
    pub participant_id: Option<i64>,
    pub overall_rating: Option<i32>,
    pub instructor_rating: Option<i32>,
    pub content_rating: Option<i32>,
    pub relevance_rating: Option<i32>,
    pub comments: Option<String>,
    pub suggestions: Option<String>,
    pub would_recommend: Option<bool>,
    pub application_plan: Option<String>,
}

impl SubmitFeedbackRequest {
    /// All four ratings, when every one was supplied
    pub fn ratings(&self) -> Option<[i32; 4]> {
        Some([
            self.overall_rating?,
            self.instructor_rating?,
            self.content_rating?,
            self.relevance_rating?,
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFeedbackRequest {
    pub notes: Option<String>,
    pub action: Option<String>,
}
