//! Attendance service implementation
//!
//! Check-in, check-out and verification-code entry for event participants,
//! coordinator verification, and the per-event attendance roster.

use std::collections::HashMap;
use chrono::Utc;
use tracing::{debug, info};
use crate::compliance::roster::{build_roster, Roster};
use crate::database::DatabaseService;
use crate::models::{AttendanceAction, AttendanceRecord, CompletionUpdate, RecordAttendanceRequest};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::logging::log_attendance_action;

/// A validated attendance submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceCommand {
    pub event_id: i64,
    pub participant_id: i64,
    pub action: AttendanceAction,
    pub verification_code: Option<String>,
}

impl TryFrom<RecordAttendanceRequest> for AttendanceCommand {
    type Error = AceError;

    fn try_from(request: RecordAttendanceRequest) -> Result<Self> {
        let (event_id, participant_id, raw_action) = match (request.event_id, request.participant_id, request.action) {
            (Some(event_id), Some(participant_id), Some(action)) if !action.is_empty() => (event_id, participant_id, action),
            _ => return Err(AceError::validation("Missing required fields: event_id, participant_id, action")),
        };

        let action = raw_action.parse::<AttendanceAction>().map_err(|_| {
            AceError::validation("Invalid action. Must be \"check_in\", \"check_out\", or \"verify_code\"")
        })?;

        let verification_code = request.verification_code.filter(|code| !code.trim().is_empty());
        if action == AttendanceAction::VerifyCode && verification_code.is_none() {
            return Err(AceError::validation("verification_code is required for verify_code action"));
        }

        Ok(Self { event_id, participant_id, action, verification_code })
    }
}

/// Storage change an attendance action resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceStep {
    SignIn { code: Option<String> },
    AlreadySignedIn(i64),
    SignOut(i64),
    RecordCode { id: i64, code: String },
}

/// Decide what an action does given the participant's current record
pub fn plan_step(command: &AttendanceCommand, existing: Option<&AttendanceRecord>) -> Result<AttendanceStep> {
    match (command.action, existing) {
        (AttendanceAction::CheckIn, None) => Ok(AttendanceStep::SignIn { code: None }),
        (AttendanceAction::CheckIn, Some(record)) => Ok(AttendanceStep::AlreadySignedIn(record.id)),
        (AttendanceAction::CheckOut, None) => Err(AceError::validation("No check-in record found. Please check in first.")),
        (AttendanceAction::CheckOut, Some(record)) if record.sign_out_timestamp.is_some() => {
            Err(AceError::validation("Already checked out"))
        }
        (AttendanceAction::CheckOut, Some(record)) => Ok(AttendanceStep::SignOut(record.id)),
        (AttendanceAction::VerifyCode, existing) => {
            let code = command.verification_code.clone().unwrap_or_default();
            Ok(match existing {
                Some(record) => AttendanceStep::RecordCode { id: record.id, code },
                None => AttendanceStep::SignIn { code: Some(code) },
            })
        }
    }
}

/// Attendance service
#[derive(Clone, Debug)]
pub struct AttendanceService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl AttendanceService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// Apply a check-in, check-out or code entry
    pub async fn record(&self, command: AttendanceCommand) -> Result<AttendanceRecord> {
        let AttendanceCommand { event_id, participant_id, action, .. } = command;
        debug!(event_id, participant_id, action = %action, "Recording attendance");

        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))?;
        if self.db.participants.find_by_id(participant_id).await?.is_none() {
            return Err(AceError::not_found("Participant", participant_id));
        }

        let existing = self.db.attendance.find_by_event_and_participant(event_id, participant_id).await?;
        let now = Utc::now();

        let record = match plan_step(&command, existing.as_ref())? {
            AttendanceStep::SignIn { code } => {
                let record = self.db.attendance.create_sign_in(event_id, participant_id, code, now).await?;
                self.db
                    .registrations
                    .update_completion(
                        event_id,
                        participant_id,
                        CompletionUpdate { attendance_verified: Some(true), ..Default::default() },
                    )
                    .await?;
                record
            }
            AttendanceStep::AlreadySignedIn(_) => existing.ok_or_else(|| AceError::not_found("Attendance record", participant_id))?,
            AttendanceStep::SignOut(id) => self.db.attendance.record_sign_out(id, now).await?,
            AttendanceStep::RecordCode { id, code } => self.db.attendance.record_code(id, &code, now).await?,
        };

        self.cache.invalidate(event.provider_id).await;
        log_attendance_action(event_id, participant_id, action.as_str());
        Ok(record)
    }

    /// Coordinator confirms or withdraws a participant's attendance
    pub async fn verify(&self, id: i64, verified: bool, verified_by: &str) -> Result<AttendanceRecord> {
        let record = self.db.attendance.set_verified(id, verified, verified_by, Utc::now()).await?;
        self.db
            .registrations
            .update_completion(
                record.event_id,
                record.participant_id,
                CompletionUpdate { attendance_verified: Some(verified), ..Default::default() },
            )
            .await?;
        if let Some(event) = self.db.events.find_by_id(record.event_id).await? {
            self.cache.invalidate(event.provider_id).await;
        }

        info!(record_id = id, verified, verified_by = %verified_by, "Attendance verification updated");
        Ok(record)
    }

    /// Attendance lookup by event, participant, or both
    pub async fn query(&self, event_id: Option<i64>, participant_id: Option<i64>) -> Result<Vec<AttendanceRecord>> {
        match (event_id, participant_id) {
            (Some(event_id), Some(participant_id)) => Ok(self
                .db
                .attendance
                .find_by_event_and_participant(event_id, participant_id)
                .await?
                .into_iter()
                .collect()),
            (Some(event_id), None) => self.db.attendance.list_by_events(&[event_id]).await,
            (None, Some(participant_id)) => self.db.attendance.list_by_participant(participant_id).await,
            (None, None) => Err(AceError::validation("Please provide event_id or participant_id parameter")),
        }
    }

    /// Attendance roster with absent confirmed registrants
    pub async fn event_roster(&self, event_id: i64) -> Result<Roster> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))?;

        let event_ids = [event_id];
        let (records, registrations) = tokio::try_join!(
            self.db.attendance.list_by_events(&event_ids),
            self.db.registrations.list_by_event(event_id),
        )?;

        let mut ids: Vec<i64> = records
            .iter()
            .map(|r| r.participant_id)
            .chain(registrations.iter().map(|r| r.participant_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let people: HashMap<i64, _> = self
            .db
            .participants
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(build_roster(&event, &records, &registrations, &people, Utc::now()))
    }
}
