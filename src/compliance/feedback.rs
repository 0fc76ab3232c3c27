//! Aggregated feedback ratings for an event

use serde::Serialize;
use crate::models::FeedbackResponse;
use crate::utils::helpers::{percentage, round_one_decimal};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub total_responses: usize,
    pub average_rating: f64,
    pub average_instructor_rating: f64,
    pub average_content_rating: f64,
    pub average_relevance_rating: f64,
    pub recommend_percentage: u32,
}

fn average(responses: &[FeedbackResponse], rating: impl Fn(&FeedbackResponse) -> i32) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let total: i32 = responses.iter().map(rating).sum();
    round_one_decimal(total as f64 / responses.len() as f64)
}

pub fn summarize(responses: &[FeedbackResponse]) -> FeedbackSummary {
    let recommending = responses
        .iter()
        .filter(|r| r.would_recommend == Some(true))
        .count();

    FeedbackSummary {
        total_responses: responses.len(),
        average_rating: average(responses, |r| r.rating),
        average_instructor_rating: average(responses, |r| r.instructor_rating),
        average_content_rating: average(responses, |r| r.content_rating),
        average_relevance_rating: average(responses, |r| r.relevance_rating),
        recommend_percentage: percentage(recommending, responses.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures::feedback;

    #[test]
    fn test_summary_rounds_averages() {
        let mut responses = vec![feedback(1, 1, 5, false), feedback(2, 1, 4, false), feedback(3, 1, 4, false)];
        responses[2].instructor_rating = 3;

        let summary = summarize(&responses);
        assert_eq!(summary.total_responses, 3);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.average_instructor_rating, 4.0);
        assert_eq!(summary.recommend_percentage, 100);
    }

    #[test]
    fn test_recommend_percentage_ignores_unanswered() {
        let mut responses = vec![feedback(1, 1, 5, false), feedback(2, 1, 2, false), feedback(3, 1, 5, false)];
        responses[2].would_recommend = None;

        let summary = summarize(&responses);
        assert_eq!(summary.recommend_percentage, 33);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.recommend_percentage, 0);
    }
}
