//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    /// Approval lifecycle of a CE event
    EventStatus, "event status" {
        Draft => "draft",
        PendingApproval => "pending_approval",
        Approved => "approved",
        InProgress => "in_progress",
        Completed => "completed",
        Archived => "archived",
    }
}

impl EventStatus {
    /// Statuses reachable from `self`
    pub fn allowed_transitions(&self) -> &'static [EventStatus] {
        use EventStatus::*;
        match self {
            Draft => &[PendingApproval, Archived],
            PendingApproval => &[Approved, Draft, Archived],
            Approved => &[InProgress, Archived],
            InProgress => &[Completed, Archived],
            Completed => &[Archived],
            Archived => &[],
        }
    }

    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::PendingApproval => "Pending Approval",
            EventStatus::Approved => "Approved",
            EventStatus::InProgress => "In Progress",
            EventStatus::Completed => "Completed",
            EventStatus::Archived => "Archived",
        }
    }

    /// Events open for registration and listed publicly
    pub fn is_open(&self) -> bool {
        matches!(self, EventStatus::Approved | EventStatus::InProgress)
    }
}

text_enum! {
    CeCategory, "CE category" {
        Learning => "learning",
        Ethics => "ethics",
        Supervision => "supervision",
        Teaching => "teaching",
    }
}

text_enum! {
    Modality, "modality" {
        InPerson => "in_person",
        Synchronous => "synchronous",
        Asynchronous => "asynchronous",
    }
}

text_enum! {
    /// CE events award CEUs, PD events award PDUs
    EventType, "event type" {
        Ce => "ce",
        Pd => "pd",
    }
}

text_enum! {
    EventSubtype, "event subtype" {
        Standard => "standard",
        JournalClub => "journal_club",
        Podcast => "podcast",
    }
}

text_enum! {
    VerificationMethod, "verification method" {
        AttendanceLog => "attendance_log",
        QuizCompletion => "quiz_completion",
        VerificationCode => "verification_code",
        TimeOnTask => "time_on_task",
        CheckInPrompts => "check_in_prompts",
    }
}

text_enum! {
    InstructorRole, "instructor role" {
        Lead => "lead",
        CoPresenter => "co_presenter",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub total_ceus: f64,
    #[sqlx(try_from = "String")]
    pub ce_category: CeCategory,
    #[sqlx(try_from = "String")]
    pub modality: Modality,
    #[sqlx(try_from = "String")]
    pub event_type: EventType,
    #[sqlx(try_from = "String")]
    pub event_subtype: EventSubtype,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub current_participants: i32,
    pub location: Option<String>,
    pub online_meeting_url: Option<String>,
    pub fee: Option<f64>,
    #[sqlx(try_from = "String")]
    pub verification_method: VerificationMethod,
    pub passing_score_percentage: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub minimum_questions_required: Option<i32>,
    pub actual_questions_count: i32,
    pub learning_objectives: Vec<String>,
    pub instructor_qualifications_summary: Option<String>,
    pub instructor_affiliations: Option<String>,
    pub conflicts_of_interest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// End date, or start date for single-session events
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn is_async(&self) -> bool {
        self.modality == Modality::Asynchronous
    }

    pub fn is_free(&self) -> bool {
        self.fee.map_or(true, |fee| fee <= 0.0)
    }

    pub fn is_full(&self) -> bool {
        self.max_participants
            .map_or(false, |max| self.current_participants >= max)
    }

    /// Scheduled length in whole minutes, when an end date is known
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_date.map(|end| {
            let millis = end.signed_duration_since(self.start_date).num_milliseconds();
            (millis as f64 / 60_000.0).round() as i64
        })
    }

    /// Problems blocking submission for approval; empty when ready
    pub fn submission_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Event must have a title".to_string());
        }
        if self.learning_objectives.len() < 3 {
            errors.push("Event must have at least 3 learning objectives".to_string());
        }
        if self.total_ceus <= 0.0 {
            errors.push("Event must award at least some CEUs/PDUs".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub provider_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub total_ceus: f64,
    pub ce_category: CeCategory,
    pub modality: Modality,
    pub event_type: Option<EventType>,
    pub event_subtype: Option<EventSubtype>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub location: Option<String>,
    pub online_meeting_url: Option<String>,
    pub fee: Option<f64>,
    pub verification_method: Option<VerificationMethod>,
    pub passing_score_percentage: Option<i32>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    pub instructor_qualifications_summary: Option<String>,
    pub instructor_affiliations: Option<String>,
    pub conflicts_of_interest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub total_ceus: Option<f64>,
    pub ce_category: Option<CeCategory>,
    pub modality: Option<Modality>,
    pub event_subtype: Option<EventSubtype>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub location: Option<String>,
    pub online_meeting_url: Option<String>,
    pub fee: Option<f64>,
    pub verification_method: Option<VerificationMethod>,
    pub passing_score_percentage: Option<i32>,
    pub learning_objectives: Option<Vec<String>>,
    pub instructor_qualifications_summary: Option<String>,
    pub instructor_affiliations: Option<String>,
    pub conflicts_of_interest: Option<String>,
}

/// Body of a status change; the raw string is validated by the handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: Option<String>,
}

/// Public listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub category: Option<CeCategory>,
    pub modality: Option<Modality>,
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignInstructorRequest {
    pub user_id: Option<i64>,
    pub role: Option<InstructorRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventInstructor {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub role: InstructorRole,
    pub created_at: DateTime<Utc>,
}
