//! Quiz models

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use super::text_enum;

text_enum! {
    QuestionType, "question type" {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        MultipleSelect => "multiple_select",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub passing_score_percentage: i32,
    pub max_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub shuffle_questions: bool,
    pub show_correct_answers: bool,
    pub is_required: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    #[sqlx(try_from = "String")]
    pub question_type: QuestionType,
    pub options: Json<Vec<QuestionOption>>,
    pub correct_answers: Vec<String>,
    pub explanation: Option<String>,
    pub points: i32,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSubmission {
    pub id: i64,
    pub quiz_id: i64,
    pub participant_id: i64,
    pub event_id: i64,
    pub attempt_number: i32,
    pub answers: Json<HashMap<i64, Vec<String>>>,
    pub score: i32,
    pub total_questions: i32,
    pub score_percentage: i32,
    pub passed: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizRequest {
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub passing_score_percentage: Option<i32>,
    pub max_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub show_correct_answers: bool,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuestionRequest {
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub correct_answers: Vec<String>,
    pub explanation: Option<String>,
    pub points: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub participant_id: i64,
    pub answers: HashMap<i64, Vec<String>>,
}
