//! CEU/PDU calculation
//!
//! Credits accrue in half units for every full 25 minutes of instruction.
//! Asynchronous CE events need a quiz with three questions per credit.

use serde::Serialize;
use crate::models::{Event, EventStatus, EventSubtype, EventType, Modality};

pub const MINUTES_PER_HALF_CREDIT: i64 = 25;
pub const QUESTIONS_PER_CREDIT: f64 = 3.0;
/// Journal club articles and podcast episodes award at most one credit each
pub const PER_ITEM_CREDIT_CAP: f64 = 1.0;
pub const SPLIT_SESSION_MINUTES: i64 = 480;
pub const MIN_LEARNING_OBJECTIVES: usize = 3;
/// Longest duration the calculator accepts, one week
pub const MAX_DURATION_MINUTES: i64 = 10_080;
/// Suggested question marks listed by the calculator
pub const MAX_DISTRIBUTION_ENTRIES: i64 = 100;

pub fn calculate_ceus(duration_minutes: i64) -> f64 {
    if duration_minutes < 0 {
        return 0.0;
    }
    (duration_minutes / MINUTES_PER_HALF_CREDIT) as f64 * 0.5
}

/// Quiz questions needed for an event awarding `ceus`; at least three
pub fn minimum_questions(ceus: f64) -> u32 {
    if ceus <= 0.0 {
        return 0;
    }
    ((ceus / 0.5).ceil() as u32).saturating_mul(3).max(3)
}

/// Stored question requirement: only asynchronous CE events carry one
pub fn required_questions(event_type: EventType, modality: Modality, total_ceus: f64) -> Option<i32> {
    if event_type == EventType::Ce && modality == Modality::Asynchronous {
        Some((total_ceus * QUESTIONS_PER_CREDIT).ceil() as i32)
    } else {
        None
    }
}

/// Whether a single item of `subtype` stays within its credit cap
pub fn within_item_cap(subtype: EventSubtype, ceus: f64) -> bool {
    match subtype {
        EventSubtype::JournalClub | EventSubtype::Podcast => ceus <= PER_ITEM_CREDIT_CAP,
        EventSubtype::Standard => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DurationValidation {
    fn valid() -> Self {
        Self { valid: true, message: None }
    }

    fn invalid(message: &str) -> Self {
        Self { valid: false, message: Some(message.to_string()) }
    }
}

pub fn validate_duration(minutes: i64) -> DurationValidation {
    if minutes < 0 {
        return DurationValidation::invalid("Duration cannot be negative.");
    }
    if minutes == 0 {
        return DurationValidation::invalid("Duration must be greater than 0 minutes.");
    }
    if minutes < MINUTES_PER_HALF_CREDIT {
        return DurationValidation::invalid(
            "Duration must be at least 25 minutes to earn any CEUs/PDUs. Events shorter than 25 minutes will award 0 credits.",
        );
    }
    if minutes > SPLIT_SESSION_MINUTES {
        return DurationValidation {
            valid: true,
            message: Some(
                "Events longer than 8 hours (480 minutes) should typically be split into multiple sessions."
                    .to_string(),
            ),
        };
    }
    DurationValidation::valid()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizDistribution {
    pub interval: i64,
    pub suggested: Vec<String>,
}

/// Spread quiz questions evenly across an event
pub fn quiz_distribution(duration_minutes: i64, total_questions: i64) -> QuizDistribution {
    if total_questions <= 0 || duration_minutes <= 0 {
        return QuizDistribution { interval: 0, suggested: Vec::new() };
    }

    let interval = duration_minutes / total_questions;
    let suggested = (0..total_questions.min(MAX_DISTRIBUTION_ENTRIES))
        .map(|i| {
            let mark = (interval as f64 * (i as f64 + 0.5)).round() as i64;
            let (hours, mins) = (mark / 60, mark % 60);
            if hours > 0 {
                format!("Question {}: at {}h {}m mark", i + 1, hours, mins)
            } else {
                format!("Question {}: at {}m mark", i + 1, mins)
            }
        })
        .collect();

    QuizDistribution { interval, suggested }
}

fn unit(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Ce => "CEU",
        EventType::Pd => "PDU",
    }
}

/// "1.5 CEUs", "1.0 PDU"
pub fn format_credits(ceus: f64, event_type: EventType) -> String {
    let plural = if ceus != 1.0 { "s" } else { "" };
    format!("{:.1} {}{}", ceus, unit(event_type), plural)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationSummary {
    pub ceus: f64,
    pub minimum_questions: u32,
    pub duration_validation: DurationValidation,
    pub warnings: Vec<String>,
    pub label: String,
}

pub fn calculation_summary(duration_minutes: i64, event_type: EventType, subtype: EventSubtype) -> CalculationSummary {
    let ceus = calculate_ceus(duration_minutes);
    let duration_validation = validate_duration(duration_minutes);
    let label = format!("{}s", unit(event_type));
    let mut warnings = Vec::new();

    if !within_item_cap(subtype, ceus) {
        let item = match subtype {
            EventSubtype::JournalClub => ("Journal club", "article"),
            _ => ("Podcast", "episode"),
        };
        warnings.push(format!(
            "{} events are capped at 1.0 {} per {}. Current calculation yields {:.1} {}.",
            item.0, label, item.1, ceus, label
        ));
    }
    if let Some(message) = &duration_validation.message {
        warnings.push(message.clone());
    }

    CalculationSummary {
        ceus: if within_item_cap(subtype, ceus) { ceus } else { PER_ITEM_CREDIT_CAP },
        minimum_questions: minimum_questions(ceus),
        duration_validation,
        warnings,
        label,
    }
}

/// An event with setup problems a coordinator should fix before approval
#[derive(Debug, Clone, Serialize)]
pub struct AttentionItem {
    pub event_id: i64,
    pub title: String,
    pub status: EventStatus,
    pub start_date: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceu_limit_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives_issue: Option<String>,
}

/// Problems with an event that is not yet finished; `None` when it is in order
pub fn attention_needed(event: &Event) -> Option<AttentionItem> {
    if matches!(event.status, EventStatus::Completed | EventStatus::Archived) {
        return None;
    }

    let question_issue = event
        .minimum_questions_required
        .filter(|required| event.is_async() && event.actual_questions_count < *required)
        .map(|required| {
            format!(
                "Quiz has {} of {} required questions",
                event.actual_questions_count, required
            )
        });
    let ceu_limit_issue = (!within_item_cap(event.event_subtype, event.total_ceus)).then(|| {
        format!(
            "{} exceeds the 1.0 credit limit per item",
            format_credits(event.total_ceus, event.event_type)
        )
    });
    let objectives_issue = (event.learning_objectives.len() < MIN_LEARNING_OBJECTIVES).then(|| {
        format!(
            "{} of {} learning objectives defined",
            event.learning_objectives.len(),
            MIN_LEARNING_OBJECTIVES
        )
    });

    if question_issue.is_none() && ceu_limit_issue.is_none() && objectives_issue.is_none() {
        return None;
    }

    Some(AttentionItem {
        event_id: event.id,
        title: event.title.clone(),
        status: event.status,
        start_date: event.start_date,
        question_issue,
        ceu_limit_issue,
        objectives_issue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures;
    use proptest::prelude::*;

    #[test]
    fn test_calculate_ceus() {
        assert_eq!(calculate_ceus(-10), 0.0);
        assert_eq!(calculate_ceus(24), 0.0);
        assert_eq!(calculate_ceus(25), 0.5);
        assert_eq!(calculate_ceus(50), 1.0);
        assert_eq!(calculate_ceus(90), 1.5);
        assert_eq!(calculate_ceus(480), 9.5);
    }

    #[test]
    fn test_minimum_questions() {
        assert_eq!(minimum_questions(0.0), 0);
        assert_eq!(minimum_questions(0.5), 3);
        assert_eq!(minimum_questions(1.0), 6);
        assert_eq!(minimum_questions(1.5), 9);
        assert_eq!(minimum_questions(0.2), 3);
    }

    #[test]
    fn test_required_questions_only_for_async_ce() {
        assert_eq!(required_questions(EventType::Ce, Modality::Asynchronous, 1.5), Some(5));
        assert_eq!(required_questions(EventType::Ce, Modality::Synchronous, 1.5), None);
        assert_eq!(required_questions(EventType::Pd, Modality::Asynchronous, 1.5), None);
    }

    #[test]
    fn test_validate_duration_messages() {
        assert!(!validate_duration(-1).valid);
        assert_eq!(
            validate_duration(0).message.as_deref(),
            Some("Duration must be greater than 0 minutes.")
        );
        assert!(!validate_duration(24).valid);
        assert_eq!(validate_duration(60), DurationValidation { valid: true, message: None });
        let long = validate_duration(500);
        assert!(long.valid);
        assert!(long.message.unwrap().contains("split into multiple sessions"));
    }

    #[test]
    fn test_quiz_distribution() {
        let distribution = quiz_distribution(90, 3);
        assert_eq!(distribution.interval, 30);
        assert_eq!(
            distribution.suggested,
            vec![
                "Question 1: at 15m mark".to_string(),
                "Question 2: at 45m mark".to_string(),
                "Question 3: at 1h 15m mark".to_string(),
            ]
        );
        assert!(quiz_distribution(0, 3).suggested.is_empty());
    }

    #[test]
    fn test_large_inputs_stay_bounded() {
        assert_eq!(minimum_questions(f64::MAX), u32::MAX);
        let summary = calculation_summary(i64::MAX, EventType::Ce, EventSubtype::Standard);
        assert_eq!(summary.minimum_questions, u32::MAX);

        let distribution = quiz_distribution(1_000_000, 120_000);
        assert_eq!(distribution.suggested.len(), MAX_DISTRIBUTION_ENTRIES as usize);
        assert_eq!(distribution.suggested[0], "Question 1: at 4m mark");
    }

    #[test]
    fn test_format_credits() {
        assert_eq!(format_credits(1.5, EventType::Ce), "1.5 CEUs");
        assert_eq!(format_credits(1.0, EventType::Pd), "1.0 PDU");
        assert_eq!(format_credits(2.0, EventType::Pd), "2.0 PDUs");
    }

    #[test]
    fn test_summary_caps_journal_club() {
        let summary = calculation_summary(75, EventType::Ce, EventSubtype::JournalClub);
        assert_eq!(summary.ceus, 1.0);
        assert_eq!(summary.minimum_questions, 9);
        assert_eq!(summary.label, "CEUs");
        assert_eq!(
            summary.warnings,
            vec!["Journal club events are capped at 1.0 CEUs per article. Current calculation yields 1.5 CEUs.".to_string()]
        );

        let standard = calculation_summary(75, EventType::Ce, EventSubtype::Standard);
        assert_eq!(standard.ceus, 1.5);
        assert!(standard.warnings.is_empty());
    }

    #[test]
    fn test_attention_needed() {
        let mut event = fixtures::event(1, EventStatus::Draft, 10);
        assert!(attention_needed(&event).is_none());

        event.modality = Modality::Asynchronous;
        event.minimum_questions_required = Some(5);
        event.actual_questions_count = 2;
        event.event_subtype = EventSubtype::Podcast;
        event.learning_objectives.truncate(1);
        let item = attention_needed(&event).expect("event needs attention");
        assert_eq!(item.question_issue.as_deref(), Some("Quiz has 2 of 5 required questions"));
        assert!(item.ceu_limit_issue.is_some());
        assert_eq!(item.objectives_issue.as_deref(), Some("1 of 3 learning objectives defined"));

        event.status = EventStatus::Completed;
        assert!(attention_needed(&event).is_none());
    }

    proptest! {
        #[test]
        fn prop_ceus_are_half_units_and_monotonic(minutes in 0i64..2000) {
            let ceus = calculate_ceus(minutes);
            prop_assert_eq!((ceus * 2.0).fract(), 0.0);
            prop_assert!(calculate_ceus(minutes + 1) >= ceus);
            prop_assert!(ceus * 50.0 <= minutes as f64);
        }

        #[test]
        fn prop_minimum_questions_at_least_three(half_units in 1u32..40) {
            let ceus = half_units as f64 * 0.5;
            let questions = minimum_questions(ceus);
            prop_assert!(questions >= 3);
            prop_assert_eq!(questions, half_units * 3);
        }
    }
}
