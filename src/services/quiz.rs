//! Quiz service implementation
//!
//! Quizzes belong to an event. Adding or removing questions keeps the event's
//! question count in step so the minimum-question rule can be checked before
//! approval.

use std::collections::HashMap;
use serde::Serialize;
use tracing::{debug, info};
use crate::compliance::grading::grade;
use crate::database::repositories::NewSubmission;
use crate::database::DatabaseService;
use crate::models::{AddQuestionRequest, CompletionUpdate, CreateQuizRequest, Quiz, QuizQuestion, SubmitQuizRequest};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};

const DEFAULT_PASSING_SCORE: i32 = 80;

/// Graded attempt returned to the participant
#[derive(Debug, Clone, Serialize)]
pub struct QuizOutcome {
    pub submission_id: i64,
    pub attempt_number: i32,
    pub passed: bool,
    pub score: i32,
    pub total_questions: i32,
    pub score_percentage: i32,
    pub passing_score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<HashMap<i64, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanations: Option<HashMap<i64, String>>,
}

pub fn validate_question(request: &AddQuestionRequest) -> Result<()> {
    if request.question_text.trim().is_empty() || request.options.is_empty() || request.correct_answers.is_empty() {
        return Err(AceError::validation("Missing required fields: question_text, options, correct_answers"));
    }
    if let Some(unknown) = request
        .correct_answers
        .iter()
        .find(|answer| !request.options.iter().any(|o| &&o.id == answer))
    {
        return Err(AceError::validation(format!("Correct answer \"{}\" is not one of the options", unknown)));
    }
    Ok(())
}

/// Next attempt number, refusing once the quiz's limit is used up
pub fn next_attempt(quiz: &Quiz, previous_attempts: usize) -> Result<i32> {
    let previous = previous_attempts as i32;
    match quiz.max_attempts {
        Some(max) if previous >= max => Err(AceError::Conflict(format!(
            "Maximum number of attempts ({}) reached for this quiz",
            max
        ))),
        _ => Ok(previous + 1),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Clone, Debug)]
pub struct QuizService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl QuizService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    pub async fn create(&self, request: CreateQuizRequest) -> Result<Quiz> {
        if request.title.trim().is_empty() {
            return Err(AceError::validation("Missing required field: title"));
        }
        let event = self
            .db
            .events
            .find_by_id(request.event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", request.event_id))?;

        if let Some(existing) = self.db.quizzes.find_by_event(event.id).await? {
            return Err(AceError::Conflict(format!(
                "Event already has an active quiz (id {})",
                existing.id
            )));
        }

        let default_passing = event.passing_score_percentage.unwrap_or(DEFAULT_PASSING_SCORE);
        let quiz = self.db.quizzes.create(request, default_passing).await?;
        self.cache.invalidate(event.provider_id).await;

        info!(quiz_id = quiz.id, event_id = quiz.event_id, "Quiz created");
        Ok(quiz)
    }

    pub async fn get(&self, id: i64) -> Result<Quiz> {
        self.db
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Quiz", id))
    }

    /// A quiz with its active questions, answers included
    pub async fn with_questions(&self, id: i64) -> Result<QuizDetail> {
        let quiz = self.get(id).await?;
        let questions = self.db.quizzes.active_questions(id).await?;
        Ok(QuizDetail { quiz, questions })
    }

    pub async fn add_question(&self, quiz_id: i64, request: AddQuestionRequest) -> Result<QuizQuestion> {
        validate_question(&request)?;
        let quiz = self.get(quiz_id).await?;

        let question = self.db.quizzes.add_question(quiz_id, request).await?;
        self.sync_question_count(quiz.event_id).await?;

        debug!(quiz_id, question_id = question.id, "Question added");
        Ok(question)
    }

    pub async fn deactivate_question(&self, question_id: i64) -> Result<QuizQuestion> {
        let question = self.db.quizzes.deactivate_question(question_id).await?;
        let quiz = self.get(question.quiz_id).await?;
        self.sync_question_count(quiz.event_id).await?;

        debug!(quiz_id = quiz.id, question_id, "Question deactivated");
        Ok(question)
    }

    /// Grade an attempt; a pass marks the registration's quiz as completed
    pub async fn submit(&self, quiz_id: i64, request: SubmitQuizRequest) -> Result<QuizOutcome> {
        let SubmitQuizRequest { participant_id, answers } = request;
        let quiz = self.get(quiz_id).await?;

        let (questions, previous) = tokio::try_join!(
            self.db.quizzes.active_questions(quiz_id),
            self.db.quizzes.submissions_for(quiz_id, participant_id),
        )?;
        let attempt_number = next_attempt(&quiz, previous.len())?;

        let result = grade(&questions, &answers, quiz.passing_score_percentage);
        let submission = self
            .db
            .quizzes
            .create_submission(NewSubmission {
                quiz_id,
                participant_id,
                event_id: quiz.event_id,
                attempt_number,
                answers,
                score: result.score,
                total_questions: result.total_questions,
                score_percentage: result.score_percentage,
                passed: result.passed,
            })
            .await?;

        if result.passed {
            self.db
                .registrations
                .update_completion(
                    quiz.event_id,
                    participant_id,
                    CompletionUpdate { quiz_completed: Some(true), ..Default::default() },
                )
                .await?;
        }

        info!(
            quiz_id,
            participant_id,
            attempt_number,
            score_percentage = result.score_percentage,
            passed = result.passed,
            "Quiz submitted"
        );

        let reveal = quiz.show_correct_answers;
        Ok(QuizOutcome {
            submission_id: submission.id,
            attempt_number,
            passed: result.passed,
            score: result.score,
            total_questions: result.total_questions,
            score_percentage: result.score_percentage,
            passing_score: quiz.passing_score_percentage,
            correct_answers: reveal.then_some(result.correct_answers),
            explanations: reveal.then_some(result.explanations),
        })
    }

    async fn sync_question_count(&self, event_id: i64) -> Result<()> {
        let count = self.db.quizzes.count_active_for_event(event_id).await?;
        self.db.events.set_actual_questions_count(event_id, count as i32).await?;
        if let Some(event) = self.db.events.find_by_id(event_id).await? {
            self.cache.invalidate(event.provider_id).await;
        }
        Ok(())
    }
}
