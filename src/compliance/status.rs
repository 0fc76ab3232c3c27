//! Coordinator certification and provider standing

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::models::{Participant, Provider, ProviderType};
use crate::utils::helpers::days_until;

/// Renewal opens this many days before expiration
pub const RENEWAL_WINDOW_DAYS: i64 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Critical,
    Warning,
    Safe,
}

/// Severity of a coordinator certification expiring in `days`
pub fn certification_severity(days_until_expiration: Option<i64>) -> Severity {
    match days_until_expiration {
        None => Severity::Info,
        Some(days) if days < 30 => Severity::Critical,
        Some(days) if days <= 90 => Severity::Warning,
        Some(_) => Severity::Safe,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProviderStatus {
    Active,
    #[serde(rename = "Grace Period")]
    GracePeriod,
    Lapsed,
}

pub fn provider_status(provider: &Provider, now: DateTime<Utc>) -> ProviderStatus {
    if !provider.is_active {
        return ProviderStatus::Lapsed;
    }
    match provider.grace_period_end_date {
        Some(grace_end) if now <= grace_end => ProviderStatus::GracePeriod,
        _ => ProviderStatus::Active,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificationStatus {
    pub coordinator_name: String,
    pub credential_type: String,
    pub credential_number: Option<String>,
    pub certification_expires: Option<DateTime<Utc>>,
    pub days_until_expiration: Option<i64>,
    pub is_verified: bool,
    pub severity: Severity,
}

pub fn certification_status(
    provider: &Provider,
    coordinator: Option<&Participant>,
    now: DateTime<Utc>,
) -> CertificationStatus {
    let expires = provider.coordinator_certification_expires;
    let days_until_expiration = expires.map(|e| days_until(now, e));

    CertificationStatus {
        coordinator_name: coordinator
            .map(Participant::full_name)
            .unwrap_or_else(|| "Unknown".to_string()),
        credential_type: coordinator
            .and_then(|c| c.credential_type.clone())
            .unwrap_or_else(|| "bcba".to_string()),
        credential_number: coordinator
            .and_then(|c| c.credential_number.clone())
            .or_else(|| provider.bacb_provider_number.clone()),
        certification_expires: expires,
        days_until_expiration,
        is_verified: provider.coordinator_certification_verified,
        severity: certification_severity(days_until_expiration),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub bacb_number: Option<String>,
    pub status: ProviderStatus,
    pub is_active: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub days_until_renewal: Option<i64>,
    pub can_renew: bool,
    pub can_publish_events: bool,
    pub can_issue_certificates: bool,
}

pub fn provider_info(provider: &Provider, now: DateTime<Utc>) -> ProviderInfo {
    let days_until_renewal = provider.expiration_date.map(|e| days_until(now, e));

    ProviderInfo {
        id: provider.id,
        name: provider.provider_name.clone(),
        provider_type: provider.provider_type,
        bacb_number: provider.bacb_provider_number.clone(),
        status: provider_status(provider, now),
        is_active: provider.is_active,
        expiration_date: provider.expiration_date,
        days_until_renewal,
        can_renew: days_until_renewal.map_or(false, |days| days <= RENEWAL_WINDOW_DAYS),
        can_publish_events: provider.can_publish_events,
        can_issue_certificates: provider.can_issue_certificates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures::*;

    #[test]
    fn test_certification_severity_thresholds() {
        assert_eq!(certification_severity(None), Severity::Info);
        assert_eq!(certification_severity(Some(-3)), Severity::Critical);
        assert_eq!(certification_severity(Some(0)), Severity::Critical);
        assert_eq!(certification_severity(Some(29)), Severity::Critical);
        assert_eq!(certification_severity(Some(30)), Severity::Warning);
        assert_eq!(certification_severity(Some(90)), Severity::Warning);
        assert_eq!(certification_severity(Some(91)), Severity::Safe);
    }

    #[test]
    fn test_provider_status() {
        let mut provider = provider();
        assert_eq!(provider_status(&provider, at(0)), ProviderStatus::Active);

        provider.grace_period_end_date = Some(at(10));
        assert_eq!(provider_status(&provider, at(5)), ProviderStatus::GracePeriod);
        assert_eq!(provider_status(&provider, at(11)), ProviderStatus::Active);

        provider.is_active = false;
        assert_eq!(provider_status(&provider, at(5)), ProviderStatus::Lapsed);
    }

    #[test]
    fn test_provider_status_serializes_label() {
        assert_eq!(serde_json::to_string(&ProviderStatus::GracePeriod).unwrap(), "\"Grace Period\"");
    }

    #[test]
    fn test_certification_status_defaults() {
        let provider = provider();
        let status = certification_status(&provider, None, at(0));
        assert_eq!(status.coordinator_name, "Unknown");
        assert_eq!(status.credential_type, "bcba");
        assert_eq!(status.credential_number.as_deref(), Some("OP-24-1234"));
        assert_eq!(status.days_until_expiration, Some(400));
        assert_eq!(status.severity, Severity::Safe);

        let coordinator = person(10, "Rob", "Spain");
        let named = certification_status(&provider, Some(&coordinator), at(0));
        assert_eq!(named.coordinator_name, "Rob Spain");
    }

    #[test]
    fn test_provider_info_renewal_window() {
        let mut provider = provider();
        provider.expiration_date = Some(at(45));
        let info = provider_info(&provider, at(0));
        assert_eq!(info.days_until_renewal, Some(45));
        assert!(info.can_renew);

        provider.expiration_date = Some(at(46));
        assert!(!provider_info(&provider, at(0)).can_renew);

        provider.expiration_date = None;
        assert!(!provider_info(&provider, at(0)).can_renew);
    }
}
