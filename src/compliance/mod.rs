//! Compliance rules for ACE providers
//!
//! Everything in here is pure: functions take the current time and a
//! [`ProviderSnapshot`] loaded by the database layer, so deadlines, scores and
//! audit reports can be unit tested without a database.

pub mod credits;
pub mod deadlines;
pub mod score;
pub mod status;
pub mod retention;
pub mod audit;
pub mod export;
pub mod roster;
pub mod grading;
pub mod feedback;

use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use crate::models::{
    AttendanceRecord, Certificate, Complaint, Event, EventInstructor, EventStatus, FeedbackResponse,
    InstructorQualification, Participant, Provider, Quiz, QuizSubmission, Registration,
};

/// Days a provider has to issue certificates, review feedback and answer complaints
pub const RESPONSE_WINDOW_DAYS: i64 = 45;

/// Records must be kept for three years after the event ends
pub const RETENTION_DAYS: i64 = 3 * 365;

/// Everything the compliance rules need to know about one provider
#[derive(Debug, Clone)]
pub struct ProviderSnapshot {
    pub provider: Provider,
    pub coordinator: Option<Participant>,
    pub events: Vec<Event>,
    pub certificates: Vec<Certificate>,
    pub complaints: Vec<Complaint>,
    pub feedback: Vec<FeedbackResponse>,
    pub attendance: Vec<AttendanceRecord>,
    pub registrations: Vec<Registration>,
    pub quizzes: Vec<Quiz>,
    pub quiz_submissions: Vec<QuizSubmission>,
    pub event_instructors: Vec<EventInstructor>,
    /// Qualifications filed with this provider
    pub qualifications: Vec<InstructorQualification>,
    /// Participants referenced by qualifications and instructors, keyed by id
    pub people: HashMap<i64, Participant>,
}

/// Borrowed view of the records that belong to a single event
#[derive(Debug, Clone)]
pub struct EventRecords<'a> {
    pub event: &'a Event,
    pub attendance: Vec<&'a AttendanceRecord>,
    pub feedback: Vec<&'a FeedbackResponse>,
    pub certificates: Vec<&'a Certificate>,
    pub registrations: Vec<&'a Registration>,
    pub quizzes: Vec<&'a Quiz>,
    pub quiz_submissions: Vec<&'a QuizSubmission>,
    pub instructors: Vec<&'a EventInstructor>,
    /// Provider qualifications held by this event's instructors
    pub qualifications: Vec<&'a InstructorQualification>,
}

impl<'a> EventRecords<'a> {
    pub fn has_instructor_summary(&self) -> bool {
        self.event
            .instructor_qualifications_summary
            .as_deref()
            .map_or(false, |summary| !summary.is_empty())
    }

    pub fn verified_attendance(&self) -> usize {
        self.attendance.iter().filter(|r| r.verified).count()
    }
}

impl ProviderSnapshot {
    /// Gather the records of one event
    pub fn records_for<'a>(&'a self, event: &'a Event) -> EventRecords<'a> {
        let instructors: Vec<&EventInstructor> = self
            .event_instructors
            .iter()
            .filter(|i| i.event_id == event.id)
            .collect();
        let qualifications = self
            .qualifications
            .iter()
            .filter(|q| q.provider_id == event.provider_id)
            .filter(|q| instructors.iter().any(|i| i.user_id == q.user_id))
            .collect();

        EventRecords {
            event,
            attendance: self.attendance.iter().filter(|r| r.event_id == event.id).collect(),
            feedback: self.feedback.iter().filter(|f| f.event_id == event.id).collect(),
            certificates: self.certificates.iter().filter(|c| c.event_id == event.id).collect(),
            registrations: self.registrations.iter().filter(|r| r.event_id == event.id).collect(),
            quizzes: self.quizzes.iter().filter(|q| q.event_id == event.id).collect(),
            quiz_submissions: self.quiz_submissions.iter().filter(|s| s.event_id == event.id).collect(),
            instructors,
            qualifications,
        }
    }

    pub fn event(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn completed_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.status == EventStatus::Completed)
    }

    /// Full name of a known participant, or "Unknown"
    pub fn person_name(&self, id: i64) -> String {
        self.people
            .get(&id)
            .map(Participant::full_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn coordinator_name(&self) -> String {
        self.coordinator
            .as_ref()
            .map(Participant::full_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Last day an event's follow-up work may be completed
pub fn response_deadline(event: &Event) -> DateTime<Utc> {
    event.end_or_start() + Duration::days(RESPONSE_WINDOW_DAYS)
}

/// Date until which an event's records must be kept
pub fn retention_deadline(event: &Event) -> DateTime<Utc> {
    event.end_or_start() + Duration::days(RETENTION_DAYS)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by the compliance unit tests

    use super::*;
    use sqlx::types::Json;
    use crate::models::*;

    pub fn at(day: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp") + Duration::days(day)
    }

    pub fn person(id: i64, first: &str, last: &str) -> Participant {
        Participant {
            id,
            email: format!("{}@example.com", first.to_lowercase()),
            first_name: first.to_string(),
            last_name: last.to_string(),
            bacb_id: None,
            role: UserRole::Participant,
            credential_type: None,
            credential_number: None,
            credential_expires_at: None,
            phone: None,
            organization: None,
            is_active: true,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    pub fn provider() -> Provider {
        Provider {
            id: 1,
            provider_name: "Behavior School".to_string(),
            provider_type: ProviderType::Individual,
            bacb_provider_number: Some("OP-24-1234".to_string()),
            coordinator_id: 10,
            coordinator_years_certified: 6,
            coordinator_certification_date: None,
            coordinator_certification_expires: Some(at(400)),
            coordinator_certification_verified: true,
            primary_email: "ace@example.com".to_string(),
            primary_phone: None,
            website: None,
            application_date: Some(at(-400)),
            approval_date: Some(at(-390)),
            expiration_date: Some(at(300)),
            is_active: true,
            application_fee_paid: true,
            application_fee_amount: Some(400.0),
            application_fee_paid_date: Some(at(-400)),
            renewal_fee_paid: false,
            last_renewal_date: None,
            next_renewal_date: None,
            grace_period_end_date: None,
            late_fee_paid: false,
            late_fee_amount: None,
            late_fee_paid_date: None,
            can_publish_events: true,
            can_issue_certificates: true,
            ein: None,
            legal_entity_verified: false,
            legal_entity_verified_at: None,
            leadership_attestation_url: None,
            leadership_name: None,
            created_at: at(-400),
            updated_at: at(-400),
        }
    }

    pub fn event(id: i64, status: EventStatus, start_day: i64) -> Event {
        Event {
            id,
            provider_id: 1,
            title: format!("Event {}", id),
            description: Some("Functional behavior assessment".to_string()),
            total_ceus: 1.5,
            ce_category: CeCategory::Learning,
            modality: Modality::Synchronous,
            event_type: EventType::Ce,
            event_subtype: EventSubtype::Standard,
            start_date: at(start_day),
            end_date: Some(at(start_day) + Duration::minutes(90)),
            registration_deadline: None,
            max_participants: Some(30),
            current_participants: 0,
            location: None,
            online_meeting_url: Some("https://meet.example.com/ace".to_string()),
            fee: None,
            verification_method: VerificationMethod::AttendanceLog,
            passing_score_percentage: Some(80),
            status,
            minimum_questions_required: None,
            actual_questions_count: 0,
            learning_objectives: vec![
                "Define the function".to_string(),
                "Collect ABC data".to_string(),
                "Write a plan".to_string(),
            ],
            instructor_qualifications_summary: Some("BCBA since 2015".to_string()),
            instructor_affiliations: None,
            conflicts_of_interest: None,
            created_at: at(start_day - 30),
            updated_at: at(start_day - 30),
        }
    }

    pub fn certificate(id: i64, event_id: i64, status: CertificateStatus, issued_at: Option<DateTime<Utc>>) -> Certificate {
        Certificate {
            id,
            event_id,
            participant_id: 100 + id,
            provider_id: 1,
            certificate_number: format!("CE-2024-{:06}", id),
            participant_name: format!("Participant {}", id),
            participant_email: format!("p{}@example.com", id),
            participant_bacb_id: None,
            event_title: format!("Event {}", event_id),
            event_date: "2024-01-01".to_string(),
            instructor_name: "Rob Spain, M.S., BCBA, IBA".to_string(),
            provider_name: "Behavior School".to_string(),
            provider_number: None,
            total_ceus: 1.5,
            ce_category: "learning".to_string(),
            status,
            issued_at,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            created_at: at(0),
        }
    }

    pub fn complaint(id: i64, status: ComplaintStatus, submitted_day: i64) -> Complaint {
        Complaint {
            id,
            provider_id: 1,
            event_id: None,
            submitter_name: "Jordan Lee".to_string(),
            submitter_email: "jordan@example.com".to_string(),
            submitter_bacb_id: None,
            submitter_phone: None,
            complaint_text: "The certificate never arrived.".to_string(),
            status,
            resolution_notes: None,
            resolved_at: None,
            resolved_by: None,
            submitted_at: at(submitted_day),
            created_at: at(submitted_day),
            updated_at: at(submitted_day),
        }
    }

    pub fn feedback(id: i64, event_id: i64, rating: i32, reviewed: bool) -> FeedbackResponse {
        FeedbackResponse {
            id,
            event_id,
            participant_id: 100 + id,
            rating,
            instructor_rating: rating,
            content_rating: rating,
            relevance_rating: rating,
            comments: None,
            suggestions: None,
            would_recommend: Some(rating >= 4),
            application_plan: None,
            coordinator_reviewed_at: if reviewed { Some(at(1)) } else { None },
            coordinator_notes: None,
            coordinator_action: None,
            submitted_at: at(0),
            created_at: at(0),
        }
    }

    pub fn attendance(id: i64, event_id: i64, participant_id: i64, verified: bool) -> AttendanceRecord {
        AttendanceRecord {
            id,
            event_id,
            participant_id,
            verification_method: VerificationMethod::AttendanceLog,
            verified,
            verified_at: None,
            verified_by: None,
            sign_in_timestamp: None,
            sign_out_timestamp: None,
            verification_code_entered: None,
            verification_code_timestamp: None,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    pub fn registration(id: i64, event_id: i64, participant_id: i64, status: RegistrationStatus) -> Registration {
        Registration {
            id,
            event_id,
            participant_id,
            confirmation_code: format!("CODE{:04}", id),
            status,
            fee_amount: None,
            fee_paid: false,
            payment_date: None,
            credential_type: Some("bcba".to_string()),
            attendance_verified: false,
            quiz_completed: false,
            feedback_completed: false,
            certificate_issued: false,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    pub fn quiz(id: i64, event_id: i64) -> Quiz {
        Quiz {
            id,
            event_id,
            title: "Knowledge check".to_string(),
            description: None,
            passing_score_percentage: 80,
            max_attempts: None,
            time_limit_minutes: None,
            shuffle_questions: false,
            show_correct_answers: true,
            is_required: true,
            is_active: true,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    pub fn submission(id: i64, quiz_id: i64, event_id: i64, passed: bool) -> QuizSubmission {
        QuizSubmission {
            id,
            quiz_id,
            participant_id: 100 + id,
            event_id,
            attempt_number: 1,
            answers: Json(Default::default()),
            score: if passed { 3 } else { 1 },
            total_questions: 3,
            score_percentage: if passed { 100 } else { 33 },
            passed,
            submitted_at: at(0),
        }
    }

    pub fn qualification(id: i64, user_id: i64, approved: bool) -> InstructorQualification {
        InstructorQualification {
            id,
            user_id,
            provider_id: 1,
            is_bcba: true,
            is_bcba_d: false,
            is_phd_aba: false,
            certification_number: Some("1-23-45678".to_string()),
            certification_date: None,
            certification_expiration: Some(at(500)),
            cv_url: None,
            certification_proof_url: None,
            qualification_path: Some("active_bcba".to_string()),
            expertise_basis: None,
            years_experience_in_subject: Some(6),
            years_teaching_subject: None,
            verified_by: None,
            verified_at: if approved { Some(at(0)) } else { None },
            is_approved: approved,
            qualification_review_notes: None,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    pub fn snapshot() -> ProviderSnapshot {
        ProviderSnapshot {
            provider: provider(),
            coordinator: Some(person(10, "Rob", "Spain")),
            events: Vec::new(),
            certificates: Vec::new(),
            complaints: Vec::new(),
            feedback: Vec::new(),
            attendance: Vec::new(),
            registrations: Vec::new(),
            quizzes: Vec::new(),
            quiz_submissions: Vec::new(),
            event_instructors: Vec::new(),
            qualifications: Vec::new(),
            people: HashMap::new(),
        }
    }
}
