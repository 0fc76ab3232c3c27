//! Provider compliance score
//!
//! Starts at 100 and loses a fixed number of points per violation, floored
//! at zero.

use chrono::{DateTime, Utc};
use serde::Serialize;
use super::deadlines::{overdue_complaints, overdue_feedback_reviews};
use super::{response_deadline, ProviderSnapshot};
use crate::models::{CertificateStatus, EventStatus};

pub const LATE_CERTIFICATE_PENALTY: u32 = 5;
pub const OVERDUE_FEEDBACK_PENALTY: u32 = 3;
pub const OVERDUE_COMPLAINT_PENALTY: u32 = 10;
pub const MISSING_DOCUMENTATION_PENALTY: u32 = 5;
pub const EXPIRED_CREDENTIALS_PENALTY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplianceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl ComplianceLevel {
    pub fn for_score(score: u32) -> Self {
        match score {
            95.. => ComplianceLevel::Excellent,
            85..=94 => ComplianceLevel::Good,
            70..=84 => ComplianceLevel::Fair,
            50..=69 => ComplianceLevel::Poor,
            _ => ComplianceLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deduction {
    pub reason: String,
    pub points: u32,
    pub count: u32,
}

impl Deduction {
    pub fn total(&self) -> u32 {
        self.points * self.count
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceScore {
    pub score: u32,
    pub level: ComplianceLevel,
    pub deductions: Vec<Deduction>,
    pub calculated_at: DateTime<Utc>,
}

/// Violation counts that feed the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationCounts {
    pub late_certificates: u32,
    pub overdue_feedback: u32,
    pub overdue_complaints: u32,
    pub missing_documentation: u32,
    pub expired_credentials: bool,
}

/// Apply penalties to a set of violation counts
pub fn score_counts(counts: ViolationCounts) -> (u32, Vec<Deduction>) {
    let categories = [
        ("Certificate issued > 45 days after event completion", LATE_CERTIFICATE_PENALTY, counts.late_certificates),
        ("Feedback not reviewed within 45 days", OVERDUE_FEEDBACK_PENALTY, counts.overdue_feedback),
        ("Complaint not responded within 45 days", OVERDUE_COMPLAINT_PENALTY, counts.overdue_complaints),
        ("Event or provider missing required documentation", MISSING_DOCUMENTATION_PENALTY, counts.missing_documentation),
        ("Expired coordinator credentials", EXPIRED_CREDENTIALS_PENALTY, counts.expired_credentials as u32),
    ];

    let deductions: Vec<Deduction> = categories
        .into_iter()
        .filter(|(_, _, count)| *count > 0)
        .map(|(reason, points, count)| Deduction { reason: reason.to_string(), points, count })
        .collect();

    let lost: u32 = deductions.iter().map(Deduction::total).sum();
    (100u32.saturating_sub(lost), deductions)
}

/// Certificates issued after their deadline plus pending ones already past it
pub fn late_certificate_count(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> u32 {
    let issued_late = snapshot
        .certificates
        .iter()
        .filter(|c| c.status == CertificateStatus::Issued)
        .filter(|c| {
            match (c.issued_at, snapshot.event(c.event_id)) {
                (Some(issued_at), Some(event)) => issued_at > response_deadline(event),
                _ => false,
            }
        })
        .count();

    let pending_late = snapshot
        .completed_events()
        .filter(|event| now > response_deadline(event))
        .map(|event| {
            snapshot
                .certificates
                .iter()
                .filter(|c| c.event_id == event.id && c.status == CertificateStatus::Pending)
                .count()
        })
        .sum::<usize>();

    (issued_late + pending_late) as u32
}

/// Completed events lacking records, plus missing organization paperwork
pub fn missing_documentation_count(snapshot: &ProviderSnapshot) -> u32 {
    let events = snapshot
        .events
        .iter()
        .filter(|e| e.status == EventStatus::Completed)
        .filter(|event| {
            let records = snapshot.records_for(event);
            let missing_quiz = event.is_async() && records.quizzes.is_empty();
            event.learning_objectives.is_empty()
                || !records.has_instructor_summary()
                || records.attendance.is_empty()
                || missing_quiz
        })
        .count() as u32;

    let provider = &snapshot.provider;
    let mut organization = 0;
    if provider.is_organization() {
        if !provider.legal_entity_verified {
            organization += 1;
        }
        if provider.leadership_attestation_url.is_none() {
            organization += 1;
        }
    }

    events + organization
}

pub fn violation_counts(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> ViolationCounts {
    ViolationCounts {
        late_certificates: late_certificate_count(snapshot, now),
        overdue_feedback: overdue_feedback_reviews(snapshot, now).len() as u32,
        overdue_complaints: overdue_complaints(&snapshot.complaints, now).len() as u32,
        missing_documentation: missing_documentation_count(snapshot),
        expired_credentials: snapshot
            .provider
            .coordinator_certification_expires
            .map_or(false, |expires| now > expires),
    }
}

pub fn compliance_score(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> ComplianceScore {
    let (score, deductions) = score_counts(violation_counts(snapshot, now));
    ComplianceScore {
        score,
        level: ComplianceLevel::for_score(score),
        deductions,
        calculated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures::*;
    use crate::models::{ComplaintStatus, Modality, ProviderType};
    use proptest::prelude::*;

    #[test]
    fn test_levels() {
        assert_eq!(ComplianceLevel::for_score(100), ComplianceLevel::Excellent);
        assert_eq!(ComplianceLevel::for_score(95), ComplianceLevel::Excellent);
        assert_eq!(ComplianceLevel::for_score(94), ComplianceLevel::Good);
        assert_eq!(ComplianceLevel::for_score(85), ComplianceLevel::Good);
        assert_eq!(ComplianceLevel::for_score(70), ComplianceLevel::Fair);
        assert_eq!(ComplianceLevel::for_score(50), ComplianceLevel::Poor);
        assert_eq!(ComplianceLevel::for_score(49), ComplianceLevel::Critical);
        assert_eq!(ComplianceLevel::for_score(0), ComplianceLevel::Critical);
    }

    #[test]
    fn test_clean_provider_scores_100() {
        let score = compliance_score(&snapshot(), at(10));
        assert_eq!(score.score, 100);
        assert_eq!(score.level, ComplianceLevel::Excellent);
        assert!(score.deductions.is_empty());
    }

    #[test]
    fn test_score_counts_deductions() {
        let (score, deductions) = score_counts(ViolationCounts {
            late_certificates: 2,
            overdue_feedback: 1,
            overdue_complaints: 1,
            missing_documentation: 0,
            expired_credentials: true,
        });
        assert_eq!(score, 100 - 10 - 3 - 10 - 20);
        assert_eq!(deductions.len(), 4);
        assert_eq!(deductions[0].reason, "Certificate issued > 45 days after event completion");
        assert_eq!(deductions[0].total(), 10);
        assert_eq!(deductions[3].reason, "Expired coordinator credentials");
        assert_eq!(deductions[3].count, 1);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let (score, _) = score_counts(ViolationCounts {
            overdue_complaints: 15,
            ..Default::default()
        });
        assert_eq!(score, 0);
    }

    #[test]
    fn test_late_certificates_include_issued_late_and_pending() {
        let mut snapshot = snapshot();
        snapshot.events = vec![event(1, EventStatus::Completed, 0)];
        snapshot.attendance = vec![attendance(1, 1, 101, true)];
        snapshot.certificates = vec![
            certificate(1, 1, CertificateStatus::Issued, Some(at(50))),
            certificate(2, 1, CertificateStatus::Issued, Some(at(5))),
            certificate(3, 1, CertificateStatus::Pending, None),
        ];

        assert_eq!(late_certificate_count(&snapshot, at(60)), 2);
        assert_eq!(late_certificate_count(&snapshot, at(20)), 0);
    }

    #[test]
    fn test_missing_documentation() {
        let mut snapshot = snapshot();
        let mut undocumented = event(2, EventStatus::Completed, 0);
        undocumented.instructor_qualifications_summary = Some(String::new());
        let mut async_event = event(3, EventStatus::Completed, 0);
        async_event.modality = Modality::Asynchronous;
        snapshot.events = vec![event(1, EventStatus::Completed, 0), undocumented, async_event];
        snapshot.attendance = vec![
            attendance(1, 1, 101, true),
            attendance(2, 2, 102, true),
            attendance(3, 3, 103, true),
        ];
        assert_eq!(missing_documentation_count(&snapshot), 2);

        snapshot.quizzes = vec![quiz(1, 3)];
        assert_eq!(missing_documentation_count(&snapshot), 1);

        snapshot.provider.provider_type = ProviderType::Organization;
        assert_eq!(missing_documentation_count(&snapshot), 3);
        snapshot.provider.legal_entity_verified = true;
        snapshot.provider.leadership_attestation_url = Some("https://example.com/attest.pdf".to_string());
        assert_eq!(missing_documentation_count(&snapshot), 1);
    }

    #[test]
    fn test_full_score() {
        let mut snapshot = snapshot();
        snapshot.events = vec![event(1, EventStatus::Completed, 0)];
        snapshot.attendance = vec![attendance(1, 1, 101, true)];
        snapshot.certificates = vec![certificate(1, 1, CertificateStatus::Pending, None)];
        snapshot.feedback = vec![feedback(1, 1, 4, false)];
        snapshot.complaints = vec![complaint(1, ComplaintStatus::Submitted, 0)];
        snapshot.provider.coordinator_certification_expires = Some(at(30));

        let score = compliance_score(&snapshot, at(60));
        assert_eq!(score.score, 100 - 5 - 3 - 10 - 20);
        assert_eq!(score.level, ComplianceLevel::Poor);
        assert_eq!(score.deductions.len(), 4);
    }

    proptest! {
        #[test]
        fn prop_score_stays_in_range(
            late in 0u32..30,
            feedback in 0u32..30,
            complaints in 0u32..30,
            missing in 0u32..30,
            expired in any::<bool>(),
        ) {
            let counts = ViolationCounts {
                late_certificates: late,
                overdue_feedback: feedback,
                overdue_complaints: complaints,
                missing_documentation: missing,
                expired_credentials: expired,
            };
            let (score, deductions) = score_counts(counts);
            prop_assert!(score <= 100);
            let lost: u32 = deductions.iter().map(Deduction::total).sum();
            prop_assert_eq!(score, 100u32.saturating_sub(lost));
        }
    }
}
