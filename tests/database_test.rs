//! Service flows against a real Postgres
//!
//! Runs against `TEST_DATABASE_URL` when set, otherwise starts a container.
//! Ignored by default: `cargo test -- --ignored`.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;
use std::collections::HashMap;
use AceDesk::database::repositories::NewCertificate;
use AceDesk::models::{
    AddQuestionRequest, AttendanceAction, CeCategory, CertificateStatus, CreateEventRequest,
    CreateParticipantRequest, CreateProviderRequest, CreateQuizRequest, Event, EventStatus, Modality, Participant,
    Provider, ProviderType, QuestionOption, QuestionType, RegisterRequest, RegistrationStatus,
    SubmitComplaintRequest, SubmitFeedbackRequest, SubmitQualificationRequest, SubmitQuizRequest,
    UpdateCertificateRequest, UserRole,
};
use AceDesk::services::AttendanceCommand;
use AceDesk::{router, AceError, AppState};
use common::*;

async fn participant(state: &AppState, role: UserRole) -> Participant {
    state
        .services
        .database
        .participants
        .create(CreateParticipantRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            first_name: "Jordan".to_string(),
            last_name: "Lee".to_string(),
            bacb_id: None,
            role: Some(role),
            credential_type: Some("BCBA".to_string()),
            credential_number: None,
            phone: None,
            organization: None,
        })
        .await
        .unwrap()
}

async fn approved_provider(state: &AppState) -> Provider {
    let coordinator = participant(state, UserRole::AceCoordinator).await;
    let providers = &state.services.provider_service;
    let provider = providers
        .create(CreateProviderRequest {
            provider_name: "Behavior School".to_string(),
            provider_type: ProviderType::Organization,
            coordinator_id: coordinator.id,
            coordinator_years_certified: 7,
            coordinator_certification_date: None,
            coordinator_certification_expires: Some(Utc::now() + Duration::days(400)),
            primary_email: "ce@behaviorschool.example".to_string(),
            primary_phone: None,
            website: Some("https://behaviorschool.example".to_string()),
            ein: None,
            leadership_name: Some("Rob Spain".to_string()),
        })
        .await
        .unwrap();
    assert!(!provider.is_active);

    providers.approve(provider.id, "admin@example.com").await.unwrap()
}

fn draft_event(provider_id: i64) -> CreateEventRequest {
    CreateEventRequest {
        provider_id,
        title: "Ethics in School-Based Practice".to_string(),
        description: Some("Two hours of ethics content".to_string()),
        total_ceus: 2.0,
        ce_category: CeCategory::Ethics,
        modality: Modality::Synchronous,
        event_type: None,
        event_subtype: None,
        start_date: Utc::now() + Duration::days(30),
        end_date: Some(Utc::now() + Duration::days(30) + Duration::hours(2)),
        registration_deadline: None,
        max_participants: Some(25),
        location: None,
        online_meeting_url: Some("https://meet.example.com/ethics".to_string()),
        fee: None,
        verification_method: None,
        passing_score_percentage: None,
        learning_objectives: vec!["Identify the relevant code items".to_string()],
        instructor_qualifications_summary: None,
        instructor_affiliations: None,
        conflicts_of_interest: None,
    }
}

/// Draft event pushed through review to approved
async fn open_event(state: &AppState, provider_id: i64) -> Event {
    let mut request = draft_event(provider_id);
    request.learning_objectives = vec![
        "Identify the relevant code items".to_string(),
        "Describe two common dilemmas".to_string(),
        "Apply a decision-making model".to_string(),
    ];
    let events = &state.services.event_service;
    let event = events.create_event(request).await.unwrap();
    events
        .change_status(event.id, EventStatus::PendingApproval, Some("coordinator@example.com"))
        .await
        .unwrap();
    let (event, _) = events
        .change_status(event.id, EventStatus::Approved, Some("coordinator@example.com"))
        .await
        .unwrap();
    event
}

async fn register(state: &AppState, event_id: i64, participant_id: i64) -> AceDesk::models::Registration {
    state
        .services
        .registration_service
        .register(RegisterRequest {
            event_id: Some(event_id),
            participant_id: Some(participant_id),
            credential_type: None,
        })
        .await
        .unwrap()
}

fn attendance(event_id: i64, participant_id: i64, action: AttendanceAction) -> AttendanceCommand {
    AttendanceCommand { event_id, participant_id, action, verification_code: None }
}

fn feedback(event_id: i64, participant_id: i64) -> SubmitFeedbackRequest {
    SubmitFeedbackRequest {
        event_id: Some(event_id),
        participant_id: Some(participant_id),
        overall_rating: Some(5),
        instructor_rating: Some(4),
        content_rating: Some(5),
        relevance_rating: Some(4),
        comments: None,
        suggestions: None,
        would_recommend: Some(true),
        application_plan: None,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_provider_approval_opens_publishing() {
    let db = TestDatabase::new().await;
    let state = db.state();

    let provider = approved_provider(&state).await;

    assert!(provider.is_active);
    assert!(provider.can_publish_events);
    assert!(provider.can_issue_certificates);
    let expires = provider.expiration_date.unwrap();
    assert!(expires > Utc::now() + Duration::days(360));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_draft_event_rejects_registration_and_bad_transition() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let attendee = participant(&state, UserRole::Participant).await;

    let event = state.services.event_service.create_event(draft_event(provider.id)).await.unwrap();
    assert_eq!(event.status, EventStatus::Draft);

    let err = state
        .services
        .registration_service
        .register(RegisterRequest {
            event_id: Some(event.id),
            participant_id: Some(attendee.id),
            credential_type: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "This event is not currently accepting registrations");

    let err = state
        .services
        .event_service
        .change_status(event.id, EventStatus::Completed, Some("coordinator@example.com"))
        .await
        .unwrap_err();
    assert_matches!(err, AceError::InvalidStateTransition { ref from, ref to, .. } if from == "draft" && to == "completed");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_complaint_gets_response_deadline() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;

    let (complaint, due) = state
        .services
        .complaint_service
        .submit(SubmitComplaintRequest {
            provider_id: Some(provider.id),
            event_id: None,
            submitter_name: Some("Sam Rivera".to_string()),
            submitter_email: Some("sam@example.com".to_string()),
            submitter_bacb_id: None,
            submitter_phone: None,
            complaint_text: Some("The certificate listed the wrong hours.".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(due, complaint.submitted_at + Duration::days(45));

    let listed = state.services.complaint_service.list(Some(provider.id), None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_overdue);
    assert!(listed[0].days_until_due >= 44);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_qualification_submission_promotes_participant() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let applicant = participant(&state, UserRole::Participant).await;

    let qualification = state
        .services
        .instructor_service
        .submit(SubmitQualificationRequest {
            user_id: Some(applicant.id),
            provider_id: Some(provider.id),
            is_bcba: true,
            is_bcba_d: false,
            is_phd_aba: false,
            certification_number: Some("1-23-45678".to_string()),
            certification_date: None,
            certification_expiration: None,
            cv_url: None,
            certification_proof_url: None,
            qualification_path: None,
            expertise_basis: None,
            years_experience_in_subject: Some(5),
            years_teaching_subject: None,
        })
        .await
        .unwrap();
    assert!(!qualification.is_approved);

    let reloaded = state
        .services
        .database
        .participants
        .find_by_id(applicant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.role, UserRole::Instructor);

    let err = state
        .services
        .instructor_service
        .reject(qualification.id, None, "coordinator@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Review notes are required when rejecting a qualification");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_health_reports_database() {
    let db = TestDatabase::new().await;
    let app = router(db.state());

    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["database_healthy"], true);
    assert_eq!(body["name"], "AceDesk");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_check_out_errors() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let attendee = participant(&state, UserRole::Participant).await;
    let event = open_event(&state, provider.id).await;
    register(&state, event.id, attendee.id).await;
    let service = &state.services.attendance_service;

    let err = service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckOut))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No check-in record found. Please check in first.");

    let checked_in = service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckIn))
        .await
        .unwrap();
    let again = service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckIn))
        .await
        .unwrap();
    assert_eq!(again.id, checked_in.id);

    let checked_out = service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckOut))
        .await
        .unwrap();
    assert!(checked_out.sign_out_timestamp.is_some());

    let err = service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckOut))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Already checked out");

    let roster = service.event_roster(event.id).await.unwrap();
    assert_eq!(roster.attendance.len(), 1);
    assert_eq!(roster.summary.checked_out, 1);

    let detail = state.services.event_service.get_event(event.id).await.unwrap();
    assert_eq!(detail.provider.map(|p| p.id), Some(provider.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_certificate_issue_rules() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let attended = participant(&state, UserRole::Participant).await;
    let absent = participant(&state, UserRole::Participant).await;
    register(&state, event.id, attended.id).await;
    register(&state, event.id, absent.id).await;
    state
        .services
        .attendance_service
        .record(attendance(event.id, attended.id, AttendanceAction::CheckIn))
        .await
        .unwrap();
    let certificates = &state.services.certificate_service;

    let err = certificates.issue(event.id, absent.id, "coordinator@example.com").await.unwrap_err();
    assert_matches!(err, AceError::Validation { ref errors, .. } if errors.contains(&"Attendance not verified".to_string()));

    let first = certificates.issue(event.id, attended.id, "coordinator@example.com").await.unwrap();
    let second = certificates.issue(event.id, attended.id, "coordinator@example.com").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.certificate_number, second.certificate_number);
    assert_eq!(first.status, CertificateStatus::Issued);

    let registration = state
        .services
        .database
        .registrations
        .find_by_event_and_participant(event.id, attended.id)
        .await
        .unwrap()
        .unwrap();
    assert!(registration.certificate_issued);

    sqlx::query("UPDATE providers SET can_issue_certificates = FALSE WHERE id = $1")
        .bind(provider.id)
        .execute(&db.pool)
        .await
        .unwrap();
    let late = participant(&state, UserRole::Participant).await;
    let err = certificates.issue(event.id, late.id, "coordinator@example.com").await.unwrap_err();
    assert_matches!(err, AceError::PermissionDenied(_));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_certificate_status_updates() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let attendee = participant(&state, UserRole::Participant).await;
    register(&state, event.id, attendee.id).await;
    state
        .services
        .attendance_service
        .record(attendance(event.id, attendee.id, AttendanceAction::CheckIn))
        .await
        .unwrap();
    let certificates = &state.services.certificate_service;
    let issued = certificates.issue(event.id, attendee.id, "coordinator@example.com").await.unwrap();

    let pending = certificates
        .update_status(
            issued.id,
            UpdateCertificateRequest { status: Some("pending".to_string()), revocation_reason: None },
            "coordinator@example.com",
        )
        .await
        .unwrap();
    assert_eq!(pending.status, CertificateStatus::Pending);

    let revoked = certificates
        .update_status(
            issued.id,
            UpdateCertificateRequest {
                status: Some("revoked".to_string()),
                revocation_reason: Some("Attendance log was incomplete".to_string()),
            },
            "coordinator@example.com",
        )
        .await
        .unwrap();
    assert_eq!(revoked.status, CertificateStatus::Revoked);
    assert_eq!(revoked.revocation_reason.as_deref(), Some("Attendance log was incomplete"));

    let err = certificates
        .update_status(
            issued.id,
            UpdateCertificateRequest { status: Some("issued".to_string()), revocation_reason: None },
            "coordinator@example.com",
        )
        .await
        .unwrap_err();
    assert_matches!(err, AceError::Conflict(_));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_duplicate_certificate_number_is_a_conflict() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let repository = &state.services.database.certificates;
    let snapshot = |participant: &Participant| NewCertificate {
        event_id: event.id,
        participant_id: participant.id,
        provider_id: provider.id,
        certificate_number: format!("CE-TEST-{}", event.id),
        participant_name: participant.full_name(),
        participant_email: participant.email.clone(),
        participant_bacb_id: None,
        event_title: event.title.clone(),
        event_date: "2025-01-01".to_string(),
        instructor_name: "Rob Spain".to_string(),
        provider_name: provider.provider_name.clone(),
        provider_number: None,
        total_ceus: event.total_ceus,
        ce_category: "ethics".to_string(),
        issued_at: Utc::now(),
    };

    let first = participant(&state, UserRole::Participant).await;
    let second = participant(&state, UserRole::Participant).await;
    repository.create(snapshot(&first)).await.unwrap();
    let err = repository.create(snapshot(&second)).await.unwrap_err();

    assert!(err.is_duplicate_of("certificates_certificate_number_key"));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_second_feedback_is_a_conflict() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let attendee = participant(&state, UserRole::Participant).await;
    register(&state, event.id, attendee.id).await;
    let service = &state.services.feedback_service;

    service.submit(feedback(event.id, attendee.id)).await.unwrap();
    let err = service.submit(feedback(event.id, attendee.id)).await.unwrap_err();

    assert_matches!(err, AceError::Conflict(ref message) if message == "Feedback already submitted for this event");
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_quiz_pass_marks_completion_and_limits_attempts() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let attendee = participant(&state, UserRole::Participant).await;
    register(&state, event.id, attendee.id).await;
    let quizzes = &state.services.quiz_service;

    let quiz = quizzes
        .create(CreateQuizRequest {
            event_id: event.id,
            title: "Ethics check".to_string(),
            description: None,
            passing_score_percentage: Some(80),
            max_attempts: Some(1),
            time_limit_minutes: None,
            shuffle_questions: false,
            show_correct_answers: false,
            is_required: true,
        })
        .await
        .unwrap();
    let question = quizzes
        .add_question(
            quiz.id,
            AddQuestionRequest {
                question_text: "Which code section covers informed consent?".to_string(),
                question_type: QuestionType::MultipleChoice,
                options: vec![
                    QuestionOption { id: "a".to_string(), text: "2.11".to_string() },
                    QuestionOption { id: "b".to_string(), text: "4.01".to_string() },
                ],
                correct_answers: vec!["a".to_string()],
                explanation: None,
                points: None,
            },
        )
        .await
        .unwrap();

    let answers = HashMap::from([(question.id, vec!["a".to_string()])]);
    let outcome = quizzes
        .submit(quiz.id, SubmitQuizRequest { participant_id: attendee.id, answers: answers.clone() })
        .await
        .unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.attempt_number, 1);

    let registration = state
        .services
        .database
        .registrations
        .find_by_event_and_participant(event.id, attendee.id)
        .await
        .unwrap()
        .unwrap();
    assert!(registration.quiz_completed);

    let err = quizzes
        .submit(quiz.id, SubmitQuizRequest { participant_id: attendee.id, answers })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Maximum number of attempts (1) reached for this quiz");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_waitlist_requires_open_event() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let attendee = participant(&state, UserRole::Participant).await;
    let draft = state.services.event_service.create_event(draft_event(provider.id)).await.unwrap();
    let waitlist = |event_id| RegisterRequest {
        event_id: Some(event_id),
        participant_id: Some(attendee.id),
        credential_type: None,
    };

    let err = state.services.registration_service.join_waitlist(waitlist(draft.id)).await.unwrap_err();
    assert_eq!(err.to_string(), "This event is not currently accepting registrations");

    let open = open_event(&state, provider.id).await;
    let entry = state.services.registration_service.join_waitlist(waitlist(open.id)).await.unwrap();
    assert_eq!(entry.status, RegistrationStatus::Waitlisted);
    assert!(entry.confirmation_code.starts_with("WL-"));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_dashboard_for_unknown_provider_is_not_found() {
    let db = TestDatabase::new().await;
    let state = db.state();

    let err = state.services.compliance_service.dashboard(i64::MAX).await.unwrap_err();

    assert_matches!(err, AceError::NotFound { entity: "Provider", .. });
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_cancel_never_drops_participant_count_below_zero() {
    let db = TestDatabase::new().await;
    let state = db.state();
    let provider = approved_provider(&state).await;
    let event = open_event(&state, provider.id).await;
    let attendee = participant(&state, UserRole::Participant).await;
    let registration = register(&state, event.id, attendee.id).await;

    let reloaded = state.services.database.events.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(reloaded.current_participants, 1);

    sqlx::query("UPDATE events SET current_participants = 0 WHERE id = $1")
        .bind(event.id)
        .execute(&db.pool)
        .await
        .unwrap();
    let cancelled = state.services.registration_service.cancel(registration.id).await.unwrap();
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);

    let reloaded = state.services.database.events.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(reloaded.current_participants, 0);

    let err = state.services.registration_service.cancel(registration.id).await.unwrap_err();
    assert_matches!(err, AceError::Conflict(_));
}
