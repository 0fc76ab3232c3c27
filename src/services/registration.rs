//! Registration service implementation
//!
//! Handles event registration, the waitlist, cancellation and payment
//! confirmation. Registering keeps the event's participant count in step.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::database::repositories::NewRegistration;
use crate::database::DatabaseService;
use crate::models::{Event, RegisterRequest, Registration, RegistrationStatus};
use crate::services::notification::NotificationService;
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::helpers::{generate_confirmation_code, generate_waitlist_code};

pub const WAITLIST_MESSAGE: &str = "You have been added to the waitlist. We will notify you if a spot opens up.";

/// Only approved or running events take registrations or waitlist entries
pub fn check_accepting(event: &Event) -> Result<()> {
    if !event.status.is_open() {
        return Err(AceError::validation("This event is not currently accepting registrations"));
    }
    Ok(())
}

/// Check that an event is taking registrations right now
pub fn check_open_for_registration(event: &Event, now: DateTime<Utc>) -> Result<()> {
    check_accepting(event)?;
    if event.registration_deadline.map_or(false, |deadline| now > deadline) {
        return Err(AceError::validation("The registration deadline for this event has passed"));
    }
    if event.is_full() {
        return Err(AceError::Conflict("Event is at capacity".to_string()));
    }
    Ok(())
}

/// Free events are confirmed on registration; paid events wait for payment
pub fn initial_status(event: &Event) -> RegistrationStatus {
    if event.is_free() {
        RegistrationStatus::Confirmed
    } else {
        RegistrationStatus::Pending
    }
}

fn required_ids(request: &RegisterRequest) -> Result<(i64, i64)> {
    match (request.event_id, request.participant_id) {
        (Some(event_id), Some(participant_id)) => Ok((event_id, participant_id)),
        _ => Err(AceError::validation("Missing required fields: event_id, participant_id")),
    }
}

/// Registration service
#[derive(Clone, Debug)]
pub struct RegistrationService {
    db: DatabaseService,
    notifications: NotificationService,
    cache: DashboardCache,
}

impl RegistrationService {
    pub fn new(db: DatabaseService, notifications: NotificationService, cache: DashboardCache) -> Self {
        Self { db, notifications, cache }
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))
    }

    /// Register a participant for an event
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration> {
        let (event_id, participant_id) = required_ids(&request)?;
        debug!(event_id, participant_id, "Registering participant");

        if let Some(existing) = self.db.registrations.find_by_event_and_participant(event_id, participant_id).await? {
            return Err(AceError::AlreadyRegistered {
                message: "Already registered for this event".to_string(),
                confirmation_code: existing.confirmation_code,
            });
        }

        let event = self.load_event(event_id).await?;
        let participant = self
            .db
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or_else(|| AceError::not_found("Participant", participant_id))?;

        check_open_for_registration(&event, Utc::now())?;

        let status = initial_status(&event);
        let registration = self
            .db
            .registrations
            .create(NewRegistration {
                event_id,
                participant_id,
                confirmation_code: generate_confirmation_code(),
                status,
                fee_amount: event.fee,
                fee_paid: event.is_free(),
                credential_type: request.credential_type,
            })
            .await?;

        self.db.events.increment_participants(event_id).await?;
        self.cache.invalidate(event.provider_id).await;

        info!(
            registration_id = registration.id,
            event_id,
            participant_id,
            status = %registration.status,
            "Participant registered"
        );

        self.notifications
            .send_registration_confirmation(&participant, &event, &registration)
            .await;

        Ok(registration)
    }

    /// Put a participant on the waitlist of a full event
    pub async fn join_waitlist(&self, request: RegisterRequest) -> Result<Registration> {
        let (event_id, participant_id) = required_ids(&request)?;
        debug!(event_id, participant_id, "Joining waitlist");

        if let Some(existing) = self.db.registrations.find_by_event_and_participant(event_id, participant_id).await? {
            let message = if existing.status == RegistrationStatus::Cancelled {
                "Your previous registration was cancelled. Please contact support."
            } else {
                "You are already registered or on the waitlist for this event."
            };
            return Err(AceError::Conflict(message.to_string()));
        }

        let event = self.load_event(event_id).await?;
        check_accepting(&event)?;
        if self.db.participants.find_by_id(participant_id).await?.is_none() {
            return Err(AceError::not_found("Participant", participant_id));
        }

        let registration = self
            .db
            .registrations
            .create(NewRegistration {
                event_id,
                participant_id,
                confirmation_code: generate_waitlist_code(),
                status: RegistrationStatus::Waitlisted,
                fee_amount: event.fee,
                fee_paid: false,
                credential_type: request.credential_type,
            })
            .await?;

        info!(registration_id = registration.id, event_id, participant_id, "Participant added to waitlist");
        Ok(registration)
    }

    /// Cancel a registration and release its seat
    pub async fn cancel(&self, id: i64) -> Result<Registration> {
        let registration = self
            .db
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Registration", id))?;

        if registration.status == RegistrationStatus::Cancelled {
            return Err(AceError::Conflict("Registration is already cancelled".to_string()));
        }

        let held_seat = matches!(
            registration.status,
            RegistrationStatus::Pending | RegistrationStatus::Confirmed
        );

        let cancelled = self.db.registrations.update_status(id, RegistrationStatus::Cancelled).await?;
        if held_seat {
            self.db.events.decrement_participants(registration.event_id).await?;
        }

        if let Some(event) = self.db.events.find_by_id(registration.event_id).await? {
            self.cache.invalidate(event.provider_id).await;
        }

        info!(registration_id = id, event_id = registration.event_id, "Registration cancelled");
        Ok(cancelled)
    }

    pub async fn mark_payment_complete(&self, id: i64) -> Result<Registration> {
        let registration = self.db.registrations.mark_payment_complete(id, Utc::now()).await?;
        info!(registration_id = id, "Registration payment recorded");
        Ok(registration)
    }

    pub async fn get(&self, id: i64) -> Result<Registration> {
        self.db
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Registration", id))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Registration> {
        self.db
            .registrations
            .find_by_code(code)
            .await?
            .ok_or_else(|| AceError::not_found("Registration", code))
    }

    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.db.registrations.list_by_event(event_id).await
    }

    pub async fn list_by_participant(&self, participant_id: i64) -> Result<Vec<Registration>> {
        self.db.registrations.list_by_participant(participant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures::{at, event};
    use crate::models::EventStatus;
    use assert_matches::assert_matches;

    #[test]
    fn test_only_open_events_accept_registrations() {
        let draft = event(1, EventStatus::Draft, 10);
        let err = check_open_for_registration(&draft, at(0)).unwrap_err();
        assert_eq!(err.to_string(), "This event is not currently accepting registrations");

        assert!(check_open_for_registration(&event(1, EventStatus::Approved, 10), at(0)).is_ok());
        assert!(check_open_for_registration(&event(1, EventStatus::InProgress, 0), at(0)).is_ok());
    }

    #[test]
    fn test_waitlist_needs_open_event_but_not_a_seat() {
        let mut full = event(1, EventStatus::Approved, 10);
        full.max_participants = Some(1);
        full.current_participants = 1;
        assert!(check_accepting(&full).is_ok());

        for status in [EventStatus::Draft, EventStatus::Completed, EventStatus::Archived] {
            let closed = event(1, status, 10);
            assert_eq!(
                check_accepting(&closed).unwrap_err().to_string(),
                "This event is not currently accepting registrations"
            );
        }
    }

    #[test]
    fn test_full_event_is_a_conflict() {
        let mut full = event(1, EventStatus::Approved, 10);
        full.max_participants = Some(2);
        full.current_participants = 2;

        assert_matches!(
            check_open_for_registration(&full, at(0)),
            Err(AceError::Conflict(message)) if message == "Event is at capacity"
        );
    }

    #[test]
    fn test_registration_deadline() {
        let mut approved = event(1, EventStatus::Approved, 10);
        approved.registration_deadline = Some(at(5));

        assert!(check_open_for_registration(&approved, at(4)).is_ok());
        assert!(check_open_for_registration(&approved, at(6)).is_err());
    }

    #[test]
    fn test_initial_status_depends_on_fee() {
        let mut approved = event(1, EventStatus::Approved, 10);
        assert_eq!(initial_status(&approved), RegistrationStatus::Confirmed);

        approved.fee = Some(0.0);
        assert_eq!(initial_status(&approved), RegistrationStatus::Confirmed);

        approved.fee = Some(49.0);
        assert_eq!(initial_status(&approved), RegistrationStatus::Pending);
    }

    #[test]
    fn test_missing_ids() {
        let request = RegisterRequest { event_id: Some(1), participant_id: None, credential_type: None };
        assert_eq!(
            required_ids(&request).unwrap_err().to_string(),
            "Missing required fields: event_id, participant_id"
        );
    }
}
