//! Feedback service implementation

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use crate::compliance::feedback::{summarize, FeedbackSummary};
use crate::database::repositories::NewFeedback;
use crate::database::DatabaseService;
use crate::models::{CompletionUpdate, FeedbackResponse, ReviewFeedbackRequest, SubmitFeedbackRequest};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};

/// Check a submission and turn it into insertable values
pub fn validate_submission(request: SubmitFeedbackRequest) -> Result<NewFeedback> {
    let (event_id, participant_id) = match (request.event_id, request.participant_id) {
        (Some(event_id), Some(participant_id)) => (event_id, participant_id),
        _ => return Err(AceError::validation("Missing required fields: event_id, participant_id")),
    };

    let ratings = request
        .ratings()
        .ok_or_else(|| AceError::validation("Please provide all required ratings"))?;
    if ratings.iter().any(|rating| !(1..=5).contains(rating)) {
        return Err(AceError::validation("Ratings must be between 1 and 5"));
    }

    Ok(NewFeedback {
        event_id,
        participant_id,
        ratings,
        comments: request.comments,
        suggestions: request.suggestions,
        would_recommend: request.would_recommend,
        application_plan: request.application_plan,
    })
}

/// Responses for one event with their aggregate
#[derive(Debug, Clone, Serialize)]
pub struct EventFeedback {
    pub responses: Vec<FeedbackResponse>,
    pub summary: FeedbackSummary,
}

/// Feedback service
#[derive(Clone, Debug)]
pub struct FeedbackService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl FeedbackService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// Store one participant's feedback for an event
    pub async fn submit(&self, request: SubmitFeedbackRequest) -> Result<FeedbackResponse> {
        let new = validate_submission(request)?;
        let (event_id, participant_id) = (new.event_id, new.participant_id);
        debug!(event_id, participant_id, "Submitting feedback");

        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))?;

        if self.db.feedback.find_by_event_and_participant(event_id, participant_id).await?.is_some() {
            return Err(AceError::Conflict("Feedback already submitted for this event".to_string()));
        }

        let feedback = self.db.feedback.create(new).await?;
        self.db
            .registrations
            .update_completion(
                event_id,
                participant_id,
                CompletionUpdate { feedback_completed: Some(true), ..Default::default() },
            )
            .await?;
        self.cache.invalidate(event.provider_id).await;

        info!(feedback_id = feedback.id, event_id, participant_id, "Feedback submitted");
        Ok(feedback)
    }

    pub async fn for_event(&self, event_id: i64) -> Result<EventFeedback> {
        let responses = self.db.feedback.list_by_event(event_id).await?;
        let summary = summarize(&responses);
        Ok(EventFeedback { responses, summary })
    }

    /// Stamp the coordinator's review of a response
    pub async fn review(&self, id: i64, request: ReviewFeedbackRequest, reviewer: &str) -> Result<FeedbackResponse> {
        let feedback = self.db.feedback.review(id, request, Utc::now()).await?;
        if let Some(event) = self.db.events.find_by_id(feedback.event_id).await? {
            self.cache.invalidate(event.provider_id).await;
        }

        info!(feedback_id = id, reviewer = %reviewer, "Feedback reviewed");
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ratings: [Option<i32>; 4]) -> SubmitFeedbackRequest {
        SubmitFeedbackRequest {
            event_id: Some(1),
            participant_id: Some(101),
            overall_rating: ratings[0],
            instructor_rating: ratings[1],
            content_rating: ratings[2],
            relevance_rating: ratings[3],
            comments: Some("Clear examples".to_string()),
            suggestions: None,
            would_recommend: Some(true),
            application_plan: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let new = validate_submission(request([Some(5), Some(4), Some(4), Some(3)])).unwrap();
        assert_eq!(new.ratings, [5, 4, 4, 3]);
        assert_eq!(new.comments.as_deref(), Some("Clear examples"));
    }

    #[test]
    fn test_missing_rating() {
        let err = validate_submission(request([Some(5), None, Some(4), Some(3)])).unwrap_err();
        assert_eq!(err.to_string(), "Please provide all required ratings");
    }

    #[test]
    fn test_rating_out_of_range() {
        assert!(validate_submission(request([Some(6), Some(4), Some(4), Some(3)])).is_err());
        assert!(validate_submission(request([Some(0), Some(4), Some(4), Some(3)])).is_err());
    }

    #[test]
    fn test_missing_ids() {
        let mut missing = request([Some(5); 4]);
        missing.participant_id = None;
        let err = validate_submission(missing).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: event_id, participant_id");
    }
}
