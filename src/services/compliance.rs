//! Compliance service implementation
//!
//! Loads a [`ProviderSnapshot`] and runs the pure rules in
//! [`crate::compliance`] over it: the coordinator dashboard, record
//! retention, per-event audit checklists and exported audit reports.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use crate::compliance::audit::{audit_summary, event_audit, EventAudit};
use crate::compliance::credits::{attention_needed, AttentionItem};
use crate::compliance::deadlines::{overdue_items, OverdueItems};
use crate::compliance::export::{build_report, ComplianceReport, ExportRequest};
use crate::compliance::retention::{retention_statuses, RetentionStatus};
use crate::compliance::score::{compliance_score, ComplianceScore};
use crate::compliance::status::{certification_status, provider_info, CertificationStatus, ProviderInfo};
use crate::compliance::ProviderSnapshot;
use crate::database::DatabaseService;
use crate::models::{CertificateStatus, Event, EventStatus, ProviderStats};
use crate::services::provider::provider_stats;
use crate::services::redis::DashboardCache;
use crate::utils::errors::{AceError, Result};

const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub subtitle: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub totals: ProviderStats,
    pub pending_approvals: usize,
}

/// Everything the coordinator dashboard shows for one provider
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub certification_status: CertificationStatus,
    pub provider_info: ProviderInfo,
    pub pending_events: Vec<Event>,
    pub attention_needed: Vec<AttentionItem>,
    pub compliance_score: ComplianceScore,
    pub overdue_items: OverdueItems,
    pub recent_activity: Vec<ActivityItem>,
    pub stats: DashboardStats,
}

/// Latest issued certificates, newest first
pub fn recent_activity(snapshot: &ProviderSnapshot) -> Vec<ActivityItem> {
    let mut issued: Vec<_> = snapshot
        .certificates
        .iter()
        .filter(|c| c.status == CertificateStatus::Issued)
        .filter_map(|c| c.issued_at.map(|at| (at, c)))
        .collect();
    issued.sort_by(|a, b| b.0.cmp(&a.0));

    issued
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(timestamp, c)| ActivityItem {
            kind: "certificate_issued",
            title: format!("Certificate issued to {}", c.participant_name),
            subtitle: c.event_title.clone(),
            timestamp,
        })
        .collect()
}

pub fn build_dashboard(snapshot: &ProviderSnapshot, now: DateTime<Utc>) -> Dashboard {
    let provider = &snapshot.provider;
    let pending_events: Vec<Event> = snapshot
        .events
        .iter()
        .filter(|e| e.status == EventStatus::PendingApproval)
        .cloned()
        .collect();
    let totals = provider_stats(&snapshot.events, snapshot.registrations.len(), &snapshot.certificates, now);

    Dashboard {
        certification_status: certification_status(provider, snapshot.coordinator.as_ref(), now),
        provider_info: provider_info(provider, now),
        attention_needed: snapshot.events.iter().filter_map(attention_needed).collect(),
        compliance_score: compliance_score(snapshot, now),
        overdue_items: overdue_items(snapshot, now),
        recent_activity: recent_activity(snapshot),
        stats: DashboardStats { totals, pending_approvals: pending_events.len() },
        pending_events,
    }
}

#[derive(Clone, Debug)]
pub struct ComplianceService {
    db: DatabaseService,
    cache: DashboardCache,
}

impl ComplianceService {
    pub fn new(db: DatabaseService, cache: DashboardCache) -> Self {
        Self { db, cache }
    }

    async fn snapshot(&self, provider_id: i64) -> Result<ProviderSnapshot> {
        self.db
            .load_provider_snapshot(provider_id)
            .await?
            .ok_or_else(|| AceError::not_found("Provider", provider_id))
    }

    /// Dashboard payload, served from cache when it is fresh
    pub async fn dashboard(&self, provider_id: i64) -> Result<Value> {
        if let Some(cached) = self.cache.get::<Value>(provider_id).await {
            debug!(provider_id, "Dashboard served from cache");
            return Ok(cached);
        }

        let snapshot = self.snapshot(provider_id).await?;
        let dashboard = build_dashboard(&snapshot, Utc::now());
        let payload = serde_json::to_value(&dashboard)?;
        self.cache.store(provider_id, &payload).await;

        info!(
            provider_id,
            score = dashboard.compliance_score.score,
            total_overdue = dashboard.overdue_items.total_overdue,
            "Dashboard computed"
        );
        Ok(payload)
    }

    pub async fn retention(&self, provider_id: i64) -> Result<Vec<RetentionStatus>> {
        let snapshot = self.snapshot(provider_id).await?;
        Ok(retention_statuses(&snapshot, Utc::now()))
    }

    pub async fn event_audit_checklist(&self, event_id: i64) -> Result<EventAudit> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AceError::not_found("Event", event_id))?;
        let snapshot = self.snapshot(event.provider_id).await?;

        let event = snapshot
            .event(event_id)
            .ok_or_else(|| AceError::not_found("Event", event_id))?;
        Ok(event_audit(&snapshot.records_for(event), &snapshot.provider.provider_name))
    }

    /// Build an exportable audit report
    pub async fn export(&self, request: ExportRequest) -> Result<ComplianceReport> {
        let (provider_id, report_type, range) = request.validate()?;
        let snapshot = self.snapshot(provider_id).await?;
        let now = Utc::now();

        let audit = audit_summary(&snapshot, range, now);
        let score = compliance_score(&snapshot, now);
        let report = build_report(report_type, audit, &score, now);

        info!(provider_id, report_type = %report_type, findings = report.findings.len(), "Compliance report generated");
        Ok(report)
    }
}
