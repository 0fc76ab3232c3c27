//! Quiz repository implementation

use std::collections::HashMap;
use sqlx::PgPool;
use sqlx::types::Json;
use chrono::Utc;
use crate::models::quiz::{Quiz, QuizQuestion, QuizSubmission, CreateQuizRequest, AddQuestionRequest};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct QuizRepository {
    pool: PgPool,
}

/// Graded attempt ready to insert
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub quiz_id: i64,
    pub participant_id: i64,
    pub event_id: i64,
    pub attempt_number: i32,
    pub answers: HashMap<i64, Vec<String>>,
    pub score: i32,
    pub total_questions: i32,
    pub score_percentage: i32,
    pub passed: bool,
}

impl QuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateQuizRequest, default_passing_score: i32) -> Result<Quiz, AceError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (event_id, title, description, passing_score_percentage, max_attempts,
                time_limit_minutes, shuffle_questions, show_correct_answers, is_required, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10)
            RETURNING *
            "#
        )
        .bind(request.event_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.passing_score_percentage.unwrap_or(default_passing_score))
        .bind(request.max_attempts)
        .bind(request.time_limit_minutes)
        .bind(request.shuffle_questions)
        .bind(request.show_correct_answers)
        .bind(request.is_required)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Quiz>, AceError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            "SELECT * FROM quizzes WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    /// The active quiz of an event, if any
    pub async fn find_by_event(&self, event_id: i64) -> Result<Option<Quiz>, AceError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            "SELECT * FROM quizzes WHERE event_id = $1 AND is_active = TRUE ORDER BY created_at DESC LIMIT 1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn list_by_events(&self, event_ids: &[i64]) -> Result<Vec<Quiz>, AceError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            "SELECT * FROM quizzes WHERE event_id = ANY($1) ORDER BY created_at ASC"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    /// Append a question at the end of the quiz
    pub async fn add_question(&self, quiz_id: i64, request: AddQuestionRequest) -> Result<QuizQuestion, AceError> {
        let question = sqlx::query_as::<_, QuizQuestion>(
            r#"
            INSERT INTO quiz_questions (quiz_id, question_text, question_type, options, correct_answers,
                explanation, points, order_index, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                (SELECT COALESCE(MAX(order_index) + 1, 0) FROM quiz_questions WHERE quiz_id = $1),
                TRUE, $8, $8)
            RETURNING *
            "#
        )
        .bind(quiz_id)
        .bind(request.question_text)
        .bind(request.question_type.as_str())
        .bind(Json(request.options))
        .bind(request.correct_answers)
        .bind(request.explanation)
        .bind(request.points.unwrap_or(1))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    /// Active questions in display order
    pub async fn active_questions(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>, AceError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            "SELECT * FROM quiz_questions WHERE quiz_id = $1 AND is_active = TRUE ORDER BY order_index ASC, id ASC"
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Soft-delete a question
    pub async fn deactivate_question(&self, id: i64) -> Result<QuizQuestion, AceError> {
        let question = sqlx::query_as::<_, QuizQuestion>(
            "UPDATE quiz_questions SET is_active = FALSE, updated_at = $2 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        question.ok_or_else(|| AceError::not_found("Quiz question", id))
    }

    /// Active questions across every quiz of an event
    pub async fn count_active_for_event(&self, event_id: i64) -> Result<i64, AceError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM quiz_questions q
            JOIN quizzes z ON z.id = q.quiz_id
            WHERE z.event_id = $1 AND q.is_active = TRUE
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Attempts by a participant, latest first
    pub async fn submissions_for(&self, quiz_id: i64, participant_id: i64) -> Result<Vec<QuizSubmission>, AceError> {
        let submissions = sqlx::query_as::<_, QuizSubmission>(
            "SELECT * FROM quiz_submissions WHERE quiz_id = $1 AND participant_id = $2 ORDER BY attempt_number DESC"
        )
        .bind(quiz_id)
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    pub async fn create_submission(&self, new: NewSubmission) -> Result<QuizSubmission, AceError> {
        let submission = sqlx::query_as::<_, QuizSubmission>(
            r#"
            INSERT INTO quiz_submissions (quiz_id, participant_id, event_id, attempt_number, answers, score,
                total_questions, score_percentage, passed, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(new.quiz_id)
        .bind(new.participant_id)
        .bind(new.event_id)
        .bind(new.attempt_number)
        .bind(Json(new.answers))
        .bind(new.score)
        .bind(new.total_questions)
        .bind(new.score_percentage)
        .bind(new.passed)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Submissions for any of the given events
    pub async fn submissions_by_events(&self, event_ids: &[i64]) -> Result<Vec<QuizSubmission>, AceError> {
        let submissions = sqlx::query_as::<_, QuizSubmission>(
            "SELECT * FROM quiz_submissions WHERE event_id = ANY($1) ORDER BY submitted_at DESC"
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }
}
