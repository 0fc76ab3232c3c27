//! Audit checklist for a single event and the provider-wide audit summary

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::status::{provider_status, ProviderStatus};
use super::{EventRecords, ProviderSnapshot};
use crate::models::{CertificateStatus, ComplaintStatus, EventStatus, Modality, ProviderType};
use crate::utils::helpers::{percentage, round_one_decimal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub present: bool,
    pub details: String,
}

impl ChecklistItem {
    fn new(label: &'static str, present: bool, details: impl Into<String>) -> Self {
        Self { label, present, details: details.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditChecklist {
    pub syllabus: ChecklistItem,
    pub materials: ChecklistItem,
    pub recording: ChecklistItem,
    pub attendance: ChecklistItem,
    pub quiz_results: ChecklistItem,
    pub feedback: ChecklistItem,
    pub certificates: ChecklistItem,
    pub instructor_qualifications: ChecklistItem,
}

impl AuditChecklist {
    pub fn items(&self) -> [&ChecklistItem; 8] {
        [
            &self.syllabus,
            &self.materials,
            &self.recording,
            &self.attendance,
            &self.quiz_results,
            &self.feedback,
            &self.certificates,
            &self.instructor_qualifications,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventAudit {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub event_status: EventStatus,
    pub provider_name: String,
    pub checklist: AuditChecklist,
    pub readiness_percentage: u32,
    pub completed_items: usize,
    pub total_items: usize,
    pub total_registrations: usize,
    pub total_attendance: usize,
    pub total_feedback: usize,
    pub total_certificates: usize,
}

pub fn build_checklist(records: &EventRecords<'_>) -> AuditChecklist {
    let event = records.event;
    let objectives = event.learning_objectives.len();
    let has_description = event.description.as_deref().map_or(false, |d| !d.is_empty());

    let recording_details = if event.modality == Modality::InPerson {
        "In-person event - recording optional"
    } else if event.online_meeting_url.is_some() {
        "Meeting URL available"
    } else {
        "No recording URL"
    };

    let attendance = records.attendance.len();
    let attendance_details = if attendance > 0 {
        format!("{} records ({} verified)", attendance, records.verified_attendance())
    } else {
        "No attendance records".to_string()
    };

    let submissions = records.quiz_submissions.len();
    let quiz_details = if submissions > 0 {
        let passed = records.quiz_submissions.iter().filter(|s| s.passed).count();
        format!("{} submissions ({} passed)", submissions, passed)
    } else if event.is_async() {
        "No quiz results - required for async events".to_string()
    } else {
        "Synchronous event - quiz optional".to_string()
    };

    let feedback = records.feedback.len();
    let certificates = records.certificates.len();
    let certificate_details = if certificates > 0 {
        let count = |status: CertificateStatus| records.certificates.iter().filter(|c| c.status == status).count();
        format!(
            "{} issued, {} pending",
            count(CertificateStatus::Issued),
            count(CertificateStatus::Pending)
        )
    } else {
        "No certificates".to_string()
    };

    let qualified = records.qualifications.iter().any(|q| q.is_approved) || records.has_instructor_summary();
    let qualification_details = if qualified {
        format!("{} instructor(s) documented", records.instructors.len())
    } else {
        "No instructor qualifications on file".to_string()
    };

    AuditChecklist {
        syllabus: ChecklistItem::new(
            "Event Syllabus / Learning Objectives",
            objectives > 0,
            format!("{} objectives defined", objectives),
        ),
        materials: ChecklistItem::new(
            "Presentation Materials",
            has_description,
            if has_description { "Description available" } else { "No materials uploaded" },
        ),
        recording: ChecklistItem::new(
            "Recording (if applicable)",
            !event.is_async() || event.online_meeting_url.is_some(),
            recording_details,
        ),
        attendance: ChecklistItem::new("Attendance Records", attendance > 0, attendance_details),
        quiz_results: ChecklistItem::new(
            "Quiz Results",
            submissions > 0 || !event.is_async(),
            quiz_details,
        ),
        feedback: ChecklistItem::new(
            "Feedback Responses",
            feedback > 0,
            if feedback > 0 { format!("{} responses", feedback) } else { "No feedback responses".to_string() },
        ),
        certificates: ChecklistItem::new("Certificates Issued", certificates > 0, certificate_details),
        instructor_qualifications: ChecklistItem::new("Instructor Qualifications", qualified, qualification_details),
    }
}

pub fn event_audit(records: &EventRecords<'_>, provider_name: &str) -> EventAudit {
    let checklist = build_checklist(records);
    let total_items = checklist.items().len();
    let completed_items = checklist.items().iter().filter(|item| item.present).count();
    let event = records.event;

    EventAudit {
        event_id: event.id,
        event_title: event.title.clone(),
        event_date: event.start_date,
        event_status: event.status,
        provider_name: provider_name.to_string(),
        readiness_percentage: percentage(completed_items, total_items),
        completed_items,
        total_items,
        total_registrations: records.registrations.len(),
        total_attendance: records.attendance.len(),
        total_feedback: records.feedback.len(),
        total_certificates: records.certificates.len(),
        checklist,
    }
}

/// Optional bounds on event start dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderOverview {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub bacb_number: Option<String>,
    pub status: ProviderStatus,
    pub is_active: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub coordinator_name: String,
    pub coordinator_certification_expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditCounts {
    pub total_events: usize,
    pub completed_events: usize,
    pub total_certificates: usize,
    pub issued_certificates: usize,
    pub total_complaints: usize,
    pub resolved_complaints: usize,
    pub total_instructors: usize,
    pub approved_instructors: usize,
    pub total_ceus_issued: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceAudit {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub status: EventStatus,
    pub total_registrations: usize,
    pub total_attendance_records: usize,
    pub verified_attendance: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackAudit {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub total_feedback: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateAudit {
    pub event_id: i64,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub total_certificates: usize,
    pub issued: usize,
    pub pending: usize,
    pub revoked: usize,
    pub total_ceus: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualificationAudit {
    pub qualification_id: i64,
    pub instructor_name: String,
    pub instructor_email: String,
    pub is_approved: bool,
    pub is_bcba: bool,
    pub is_bcba_d: bool,
    pub qualification_path: Option<String>,
    pub certification_expiration: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl QualificationAudit {
    /// Certification lapses within `days` of `now`
    pub fn expires_within(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.certification_expiration
            .map_or(false, |expires| expires < now + Duration::days(days))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintAudit {
    pub complaint_id: i64,
    pub submitter_name: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ComplaintStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub event_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub provider: ProviderOverview,
    pub summary: AuditCounts,
    pub attendance_data: Vec<AttendanceAudit>,
    pub feedback_data: Vec<FeedbackAudit>,
    pub certificate_data: Vec<CertificateAudit>,
    pub qualifications_data: Vec<QualificationAudit>,
    pub complaint_data: Vec<ComplaintAudit>,
    pub generated_at: DateTime<Utc>,
    pub date_range: DateRange,
}

/// Collect audit data for a provider; the date range filters events only
pub fn audit_summary(snapshot: &ProviderSnapshot, range: DateRange, now: DateTime<Utc>) -> AuditSummary {
    let provider = &snapshot.provider;
    let events: Vec<_> = snapshot.events.iter().filter(|e| range.contains(e.start_date)).collect();
    let records: Vec<EventRecords<'_>> = events.iter().map(|e| snapshot.records_for(e)).collect();

    let attendance_data = records
        .iter()
        .map(|r| AttendanceAudit {
            event_id: r.event.id,
            event_title: r.event.title.clone(),
            event_date: r.event.start_date,
            status: r.event.status,
            total_registrations: r.registrations.len(),
            total_attendance_records: r.attendance.len(),
            verified_attendance: r.verified_attendance(),
        })
        .collect();

    let feedback_data = records
        .iter()
        .map(|r| {
            let average = if r.feedback.is_empty() {
                0.0
            } else {
                r.feedback.iter().map(|f| f.rating as f64).sum::<f64>() / r.feedback.len() as f64
            };
            FeedbackAudit {
                event_id: r.event.id,
                event_title: r.event.title.clone(),
                event_date: r.event.start_date,
                total_feedback: r.feedback.len(),
                average_rating: round_one_decimal(average),
            }
        })
        .collect();

    let certificate_data = records
        .iter()
        .map(|r| {
            let count = |status: CertificateStatus| r.certificates.iter().filter(|c| c.status == status).count();
            CertificateAudit {
                event_id: r.event.id,
                event_title: r.event.title.clone(),
                event_date: r.event.start_date,
                total_certificates: r.certificates.len(),
                issued: count(CertificateStatus::Issued),
                pending: count(CertificateStatus::Pending),
                revoked: count(CertificateStatus::Revoked),
                total_ceus: r
                    .certificates
                    .iter()
                    .filter(|c| c.status == CertificateStatus::Issued)
                    .map(|c| c.total_ceus)
                    .sum(),
            }
        })
        .collect();

    let qualifications_data = snapshot
        .qualifications
        .iter()
        .map(|q| {
            let person = snapshot.people.get(&q.user_id);
            QualificationAudit {
                qualification_id: q.id,
                instructor_name: snapshot.person_name(q.user_id),
                instructor_email: person.map_or_else(|| "Unknown".to_string(), |p| p.email.clone()),
                is_approved: q.is_approved,
                is_bcba: q.is_bcba,
                is_bcba_d: q.is_bcba_d,
                qualification_path: q.qualification_path.clone(),
                certification_expiration: q.certification_expiration,
                verified_at: q.verified_at,
            }
        })
        .collect();

    let complaint_data = snapshot
        .complaints
        .iter()
        .map(|c| ComplaintAudit {
            complaint_id: c.id,
            submitter_name: c.submitter_name.clone(),
            submitted_at: c.submitted_at,
            status: c.status,
            resolved_at: c.resolved_at,
            event_id: c.event_id,
        })
        .collect();

    let issued: Vec<_> = snapshot
        .certificates
        .iter()
        .filter(|c| c.status == CertificateStatus::Issued)
        .collect();

    let summary = AuditCounts {
        total_events: events.len(),
        completed_events: events.iter().filter(|e| e.status == EventStatus::Completed).count(),
        total_certificates: snapshot.certificates.len(),
        issued_certificates: issued.len(),
        total_complaints: snapshot.complaints.len(),
        resolved_complaints: snapshot
            .complaints
            .iter()
            .filter(|c| c.status == ComplaintStatus::Resolved)
            .count(),
        total_instructors: snapshot.qualifications.len(),
        approved_instructors: snapshot.qualifications.iter().filter(|q| q.is_approved).count(),
        total_ceus_issued: issued.iter().map(|c| c.total_ceus).sum(),
    };

    AuditSummary {
        provider: ProviderOverview {
            id: provider.id,
            name: provider.provider_name.clone(),
            provider_type: provider.provider_type,
            bacb_number: provider.bacb_provider_number.clone(),
            status: provider_status(provider, now),
            is_active: provider.is_active,
            expiration_date: provider.expiration_date,
            coordinator_name: snapshot.coordinator_name(),
            coordinator_certification_expires: provider.coordinator_certification_expires,
        },
        summary,
        attendance_data,
        feedback_data,
        certificate_data,
        qualifications_data,
        complaint_data,
        generated_at: now,
        date_range: range,
    }
}
