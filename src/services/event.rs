//! Event service implementation
//!
//! This service handles event creation and updates, the public catalogue and
//! the approval workflow that moves events between statuses.

use serde::Serialize;
use tracing::{debug, info, warn};
use crate::compliance::credits::required_questions;
use crate::database::DatabaseService;
use crate::models::{
    AssignInstructorRequest, CreateEventRequest, Event, EventFilter, EventInstructor, EventStatus, EventType,
    InstructorRole, Provider, UpdateEventRequest,
};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::logging::log_event_transition;

/// Event with the provider and instructors attached
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub provider: Option<Provider>,
    pub instructors: Vec<EventInstructor>,
}

/// Labels describing an applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: EventStatus,
    pub to: EventStatus,
    pub from_label: &'static str,
    pub to_label: &'static str,
}

/// Parse the raw `status` field of a status change request
pub fn parse_status(raw: Option<&str>) -> Result<EventStatus> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AceError::validation("Missing required field: status"))?;

    raw.parse::<EventStatus>().map_err(|_| {
        let valid: Vec<&str> = EventStatus::ALL.iter().map(EventStatus::as_str).collect();
        AceError::validation(format!("Invalid status: \"{}\". Valid statuses are: {}", raw, valid.join(", ")))
    })
}

/// Check that `event` may move to `requested`
pub fn validate_transition(event: &Event, requested: EventStatus) -> Result<Transition> {
    let current = event.status;

    if !current.can_transition_to(requested) {
        let allowed = current.allowed_transitions();
        let allowed_labels = if allowed.is_empty() {
            "none (terminal state)".to_string()
        } else {
            allowed.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")
        };

        return Err(AceError::InvalidStateTransition {
            from: current.as_str().to_string(),
            to: requested.as_str().to_string(),
            from_label: current.label().to_string(),
            to_label: requested.label().to_string(),
            allowed: allowed.iter().map(|s| s.as_str().to_string()).collect(),
            allowed_labels,
        });
    }

    if requested == EventStatus::PendingApproval {
        let errors = event.submission_errors();
        if !errors.is_empty() {
            return Err(AceError::Validation {
                message: "Event does not meet minimum requirements for approval submission".to_string(),
                errors,
            });
        }
    }

    Ok(Transition {
        from: current,
        to: requested,
        from_label: current.label(),
        to_label: requested.label(),
    })
}

/// Event service for the approval workflow
#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl EventService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// Create a draft event for an existing provider
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        debug!(provider_id = request.provider_id, title = %request.title, "Creating event");

        if request.title.trim().is_empty() {
            return Err(AceError::validation("Missing required field: title"));
        }
        if request.total_ceus < 0.0 {
            return Err(AceError::validation("total_ceus cannot be negative"));
        }

        let provider = self
            .db
            .providers
            .find_by_id(request.provider_id)
            .await?
            .ok_or_else(|| AceError::not_found("Provider", request.provider_id))?;

        if !provider.can_publish_events {
            warn!(provider_id = provider.id, "Provider is not yet allowed to publish events");
        }

        let minimum = required_questions(
            request.event_type.unwrap_or(EventType::Ce),
            request.modality,
            request.total_ceus,
        );
        let event = self.db.events.create(request, minimum).await?;
        self.cache.invalidate(event.provider_id).await;

        info!(event_id = event.id, provider_id = event.provider_id, "Event created");
        Ok(event)
    }

    /// Apply a partial update, recomputing the question requirement
    pub async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<Event> {
        debug!(event_id = id, "Updating event");

        let existing = self
            .db
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", id))?;

        if request.total_ceus.map_or(false, |ceus| ceus < 0.0) {
            return Err(AceError::validation("total_ceus cannot be negative"));
        }

        let minimum = if request.modality.is_some() || request.total_ceus.is_some() {
            required_questions(
                existing.event_type,
                request.modality.unwrap_or(existing.modality),
                request.total_ceus.unwrap_or(existing.total_ceus),
            )
        } else {
            None
        };

        let event = self.db.events.update(id, request, minimum).await?;
        self.cache.invalidate(event.provider_id).await;

        info!(event_id = id, "Event updated");
        Ok(event)
    }

    pub async fn get_event(&self, id: i64) -> Result<EventDetail> {
        let event = self
            .db
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", id))?;

        let event_ids = [id];
        let (provider, instructors) = tokio::try_join!(
            self.db.providers.find_by_id(event.provider_id),
            self.db.events.instructors_for_events(&event_ids),
        )?;

        Ok(EventDetail { event, provider, instructors })
    }

    /// Approved and running events, soonest first
    pub async fn list_public(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.db.events.list_public(filter, chrono::Utc::now()).await
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_by_provider(provider_id).await
    }

    /// Move an event along the approval workflow
    pub async fn change_status(&self, id: i64, requested: EventStatus, actor: Option<&str>) -> Result<(Event, Transition)> {
        debug!(event_id = id, requested = %requested, "Changing event status");

        let event = self
            .db
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", id))?;

        let transition = validate_transition(&event, requested)?;
        let updated = self.db.events.update_status(id, requested).await?;

        log_event_transition(id, transition.from.as_str(), transition.to.as_str(), actor);
        self.cache.invalidate(updated.provider_id).await;

        Ok((updated, transition))
    }

    /// Attach a lead or co-presenter; re-assigning updates the role
    pub async fn assign_instructor(&self, event_id: i64, request: AssignInstructorRequest) -> Result<EventInstructor> {
        let user_id = request
            .user_id
            .ok_or_else(|| AceError::validation("Missing required field: user_id"))?;

        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))?;
        if self.db.participants.find_by_id(user_id).await?.is_none() {
            return Err(AceError::not_found("Participant", user_id));
        }

        let role = request.role.unwrap_or(InstructorRole::Lead);
        let instructor = self.db.events.add_instructor(event_id, user_id, role).await?;
        self.cache.invalidate(event.provider_id).await;

        info!(event_id, user_id, role = %role, "Instructor assigned to event");
        Ok(instructor)
    }
}
