//! Provider service implementation
//!
//! Provider applications, approval, fee payments and the headline counts
//! shown to coordinators.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::{
    Certificate, CreateProviderRequest, Event, EventStatus, Provider, ProviderStats, RecordPaymentRequest,
    UpdateProviderRequest,
};
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_web_url, round_one_decimal};
use crate::utils::logging::log_admin_action;

/// Event counts and issued credits for one provider
pub fn provider_stats(
    events: &[Event],
    total_registrations: usize,
    certificates: &[Certificate],
    now: DateTime<Utc>,
) -> ProviderStats {
    let active_events = events
        .iter()
        .filter(|e| matches!(e.status, EventStatus::Approved | EventStatus::InProgress))
        .filter(|e| e.start_date >= now)
        .count();

    ProviderStats {
        total_events: events.len(),
        active_events,
        total_registrations,
        total_certificates: certificates.len(),
        total_ceus_issued: round_one_decimal(certificates.iter().map(|c| c.total_ceus).sum()),
    }
}

/// Check a provider application
pub fn validate_application(request: &CreateProviderRequest) -> Result<()> {
    if request.provider_name.trim().is_empty() {
        return Err(AceError::validation("Missing required field: provider_name"));
    }
    if !is_valid_email(&request.primary_email) {
        return Err(AceError::validation("Invalid email format"));
    }
    if request.coordinator_years_certified < 0 {
        return Err(AceError::validation("coordinator_years_certified cannot be negative"));
    }
    check_website(request.website.as_deref())
}

fn check_website(website: Option<&str>) -> Result<()> {
    match website {
        Some(site) if !site.trim().is_empty() && !is_valid_web_url(site) => {
            Err(AceError::validation("Invalid website URL"))
        }
        _ => Ok(()),
    }
}

#[derive(Clone, Debug)]
pub struct ProviderService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl ProviderService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    /// File a provider application; it stays inactive until approved
    pub async fn create(&self, request: CreateProviderRequest) -> Result<Provider> {
        validate_application(&request)?;
        debug!(provider_name = %request.provider_name, coordinator_id = request.coordinator_id, "Creating provider");

        if self.db.participants.find_by_id(request.coordinator_id).await?.is_none() {
            return Err(AceError::not_found("Participant", request.coordinator_id));
        }

        let provider = self.db.providers.create(request).await?;
        info!(provider_id = provider.id, "Provider application created");
        Ok(provider)
    }

    pub async fn get(&self, id: i64) -> Result<Provider> {
        self.db
            .providers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AceError::not_found("Provider", id))
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Provider>> {
        self.db.providers.list(active_only).await
    }

    pub async fn update(&self, id: i64, request: UpdateProviderRequest) -> Result<Provider> {
        if let Some(email) = request.primary_email.as_deref() {
            if !is_valid_email(email) {
                return Err(AceError::validation("Invalid email format"));
            }
        }
        check_website(request.website.as_deref())?;

        let provider = self.db.providers.update(id, request).await?;
        self.cache.invalidate(id).await;
        info!(provider_id = id, "Provider updated successfully");
        Ok(provider)
    }

    /// Activate a provider for one year
    pub async fn approve(&self, id: i64, admin: &str) -> Result<Provider> {
        let provider = self.db.providers.approve(id, Utc::now()).await?;
        self.cache.invalidate(id).await;
        log_admin_action(admin, "approve_provider", Some(&id.to_string()), None);
        Ok(provider)
    }

    pub async fn record_payment(&self, id: i64, request: RecordPaymentRequest, admin: &str) -> Result<Provider> {
        let provider = self
            .db
            .providers
            .record_payment(id, request.payment_type, request.amount, Utc::now())
            .await?;
        self.cache.invalidate(id).await;
        log_admin_action(admin, "record_payment", Some(&id.to_string()), Some(request.payment_type.as_str()));
        Ok(provider)
    }

    pub async fn stats(&self, id: i64) -> Result<ProviderStats> {
        self.get(id).await?;

        let (events, certificates) = tokio::try_join!(
            self.db.events.list_by_provider(id),
            self.db.certificates.list_by_provider(id),
        )?;
        let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let registrations = self.db.registrations.list_by_events(&event_ids).await?;

        Ok(provider_stats(&events, registrations.len(), &certificates, Utc::now()))
    }
}
