//! Quiz grading

use std::collections::{HashMap, HashSet};
use serde::Serialize;
use crate::models::QuizQuestion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub score: i32,
    pub total_questions: i32,
    pub score_percentage: i32,
    pub passed: bool,
    pub correct_answers: HashMap<i64, Vec<String>>,
    pub explanations: HashMap<i64, String>,
}

/// An answer is correct when it selects exactly the correct options, in any order.
/// Picking the same option twice is wrong.
pub fn is_correct(submitted: &[String], correct: &[String]) -> bool {
    let picked: HashSet<&str> = submitted.iter().map(String::as_str).collect();
    if picked.len() != submitted.len() {
        return false;
    }
    picked == correct.iter().map(String::as_str).collect::<HashSet<_>>()
}

/// Grade submitted answers against the active questions of a quiz
pub fn grade(
    questions: &[QuizQuestion],
    answers: &HashMap<i64, Vec<String>>,
    passing_score_percentage: i32,
) -> GradeResult {
    let mut score = 0;
    let mut correct_answers = HashMap::new();
    let mut explanations = HashMap::new();

    for question in questions {
        let submitted = answers.get(&question.id).map(Vec::as_slice).unwrap_or(&[]);
        if is_correct(submitted, &question.correct_answers) {
            score += 1;
        }
        correct_answers.insert(question.id, question.correct_answers.clone());
        if let Some(explanation) = &question.explanation {
            explanations.insert(question.id, explanation.clone());
        }
    }

    let total_questions = questions.len() as i32;
    let score_percentage = if total_questions > 0 {
        ((score as f64 / total_questions as f64) * 100.0).round() as i32
    } else {
        0
    };

    GradeResult {
        score,
        total_questions,
        score_percentage,
        passed: score_percentage >= passing_score_percentage,
        correct_answers,
        explanations,
    }
}
