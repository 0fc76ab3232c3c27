//! 45-day follow-up deadlines and overdue item lists

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use super::{response_deadline, ProviderSnapshot, RESPONSE_WINDOW_DAYS};
use crate::models::{CertificateStatus, Complaint, ComplaintStatus};
use crate::utils::helpers::{days_overdue, days_until, truncate_text};

/// Characters of complaint text shown in overdue lists
const COMPLAINT_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct PendingCertificate {
    pub certificate_id: i64,
    pub participant_name: String,
    pub participant_email: String,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueCertificates {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub pending_count: usize,
    pub deadline: DateTime<Utc>,
    pub days_overdue: i64,
    pub certificates: Vec<PendingCertificate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueFeedbackReview {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    /// Responses still awaiting coordinator review
    pub feedback_count: usize,
    pub deadline: DateTime<Utc>,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueComplaint {
    pub complaint_id: i64,
    pub submitter_name: String,
    pub submitter_email: String,
    pub complaint_text: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ComplaintStatus,
    pub event_id: Option<i64>,
    pub deadline: DateTime<Utc>,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueItems {
    pub certificates: Vec<OverdueCertificates>,
    pub feedback_reviews: Vec<OverdueFeedbackReview>,
    pub complaints: Vec<OverdueComplaint>,
    pub total_overdue: usize,
}

/// Completed events past their deadline that still have pending certificates
pub fn overdue_certificates(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> Vec<OverdueCertificates> {
    snapshot
        .completed_events()
        .filter_map(|event| {
            let deadline = response_deadline(event);
            if now <= deadline {
                return None;
            }
            let pending: Vec<PendingCertificate> = snapshot
                .certificates
                .iter()
                .filter(|c| c.event_id == event.id && c.status == CertificateStatus::Pending)
                .map(|c| PendingCertificate {
                    certificate_id: c.id,
                    participant_name: c.participant_name.clone(),
                    participant_email: c.participant_email.clone(),
                    status: c.status,
                })
                .collect();
            if pending.is_empty() {
                return None;
            }
            Some(OverdueCertificates {
                event_id: event.id,
                event_title: event.title.clone(),
                event_date: event.start_date,
                pending_count: pending.len(),
                deadline,
                days_overdue: days_overdue(now, deadline),
                certificates: pending,
            })
        })
        .collect()
}

/// Completed events past their deadline with feedback the coordinator has not reviewed
pub fn overdue_feedback_reviews(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> Vec<OverdueFeedbackReview> {
    snapshot
        .completed_events()
        .filter_map(|event| {
            let deadline = response_deadline(event);
            if now <= deadline {
                return None;
            }
            let unreviewed = snapshot
                .feedback
                .iter()
                .filter(|f| f.event_id == event.id && !f.is_reviewed())
                .count();
            if unreviewed == 0 {
                return None;
            }
            Some(OverdueFeedbackReview {
                event_id: event.id,
                event_title: event.title.clone(),
                event_date: event.start_date,
                feedback_count: unreviewed,
                deadline,
                days_overdue: days_overdue(now, deadline),
            })
        })
        .collect()
}

pub fn complaint_deadline(complaint: &Complaint) -> DateTime<Utc> {
    complaint.submitted_at + Duration::days(RESPONSE_WINDOW_DAYS)
}

/// Open complaints past the response deadline
pub fn is_complaint_overdue(complaint: &Complaint, now: DateTime<Utc>) -> bool {
    !complaint.status.is_closed() && now > complaint_deadline(complaint)
}

pub fn overdue_complaints(complaints: &[Complaint], now: DateTime<Utc>) -> Vec<OverdueComplaint> {
    complaints
        .iter()
        .filter(|c| is_complaint_overdue(c, now))
        .map(|c| {
            let deadline = complaint_deadline(c);
            OverdueComplaint {
                complaint_id: c.id,
                submitter_name: c.submitter_name.clone(),
                submitter_email: c.submitter_email.clone(),
                complaint_text: truncate_text(&c.complaint_text, COMPLAINT_PREVIEW_CHARS),
                submitted_at: c.submitted_at,
                status: c.status,
                event_id: c.event_id,
                deadline,
                days_overdue: days_overdue(now, deadline),
            }
        })
        .collect()
}

pub fn overdue_items(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> OverdueItems {
    let certificates = overdue_certificates(snapshot, now);
    let feedback_reviews = overdue_feedback_reviews(snapshot, now);
    let complaints = overdue_complaints(&snapshot.complaints, now);
    let total_overdue = certificates.len() + feedback_reviews.len() + complaints.len();

    OverdueItems { certificates, feedback_reviews, complaints, total_overdue }
}

/// Complaint with its response deadline
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintView {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub response_due_date: DateTime<Utc>,
    pub days_until_due: i64,
    pub is_overdue: bool,
}

pub fn complaint_view(complaint: Complaint, now: DateTime<Utc>) -> ComplaintView {
    let response_due_date = complaint_deadline(&complaint);
    let days_until_due = days_until(now, response_due_date);
    let is_overdue = days_until_due < 0 && !complaint.status.is_closed();

    ComplaintView { complaint, response_due_date, days_until_due, is_overdue }
}
