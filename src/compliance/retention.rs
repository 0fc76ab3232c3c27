//! Three-year record retention tracking

use chrono::{DateTime, Utc};
use serde::Serialize;
use super::{retention_deadline, EventRecords, ProviderSnapshot};
use crate::models::EventStatus;
use crate::utils::helpers::{days_until, percentage};

/// Retention flagged as due soon this many days before the deadline
pub const DUE_SOON_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionState {
    Active,
    DueSoon,
    PastDue,
    Archived,
}

/// Which of the eight retained documents exist for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionDocuments {
    pub syllabus: bool,
    pub materials: bool,
    pub recording: bool,
    pub attendance: bool,
    pub quiz_results: bool,
    pub feedback: bool,
    pub certificates: bool,
    pub instructor_qualifications: bool,
}

impl RetentionDocuments {
    pub const TOTAL: usize = 8;

    pub fn for_event(records: &EventRecords<'_>) -> Self {
        let event = records.event;
        Self {
            syllabus: !event.learning_objectives.is_empty(),
            materials: event.description.as_deref().map_or(false, |d| !d.is_empty()),
            recording: !event.is_async() || event.online_meeting_url.is_some(),
            attendance: !records.attendance.is_empty(),
            quiz_results: !records.quiz_submissions.is_empty() || !event.is_async(),
            feedback: !records.feedback.is_empty(),
            certificates: !records.certificates.is_empty(),
            instructor_qualifications: !records.qualifications.is_empty() || records.has_instructor_summary(),
        }
    }

    pub fn completed(&self) -> usize {
        [
            self.syllabus,
            self.materials,
            self.recording,
            self.attendance,
            self.quiz_results,
            self.feedback,
            self.certificates,
            self.instructor_qualifications,
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetentionStatus {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub event_end_date: DateTime<Utc>,
    pub event_status: EventStatus,
    pub retention_deadline: DateTime<Utc>,
    pub days_until_archive: i64,
    pub retention_status: RetentionState,
    pub documents: RetentionDocuments,
    pub completion_percentage: u32,
    pub completed_docs: usize,
    pub total_docs: usize,
}

pub fn retention_state(event_status: EventStatus, days_until_archive: i64) -> RetentionState {
    if event_status == EventStatus::Archived {
        RetentionState::Archived
    } else if days_until_archive < 0 {
        RetentionState::PastDue
    } else if days_until_archive <= DUE_SOON_DAYS {
        RetentionState::DueSoon
    } else {
        RetentionState::Active
    }
}

/// Retention status of every completed or archived event, soonest deadline first
pub fn retention_statuses(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> Vec<RetentionStatus> {
    let mut statuses: Vec<RetentionStatus> = snapshot
        .events
        .iter()
        .filter(|e| matches!(e.status, EventStatus::Completed | EventStatus::Archived))
        .map(|event| {
            let records = snapshot.records_for(event);
            let documents = RetentionDocuments::for_event(&records);
            let deadline = retention_deadline(event);
            let days_until_archive = days_until(now, deadline);
            let completed_docs = documents.completed();

            RetentionStatus {
                event_id: event.id,
                event_title: event.title.clone(),
                event_date: event.start_date,
                event_end_date: event.end_or_start(),
                event_status: event.status,
                retention_deadline: deadline,
                days_until_archive,
                retention_status: retention_state(event.status, days_until_archive),
                documents,
                completion_percentage: percentage(completed_docs, RetentionDocuments::TOTAL),
                completed_docs,
                total_docs: RetentionDocuments::TOTAL,
            }
        })
        .collect();

    statuses.sort_by_key(|s| s.retention_deadline);
    statuses
}
