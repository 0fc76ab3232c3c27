//! Services module
//!
//! This module contains business logic services

pub mod attendance;
pub mod certificate;
pub mod complaint;
pub mod compliance;
pub mod event;
pub mod feedback;
pub mod instructor;
pub mod notification;
pub mod provider;
pub mod quiz;
pub mod redis;
pub mod registration;

// Re-export commonly used services
pub use attendance::{AttendanceCommand, AttendanceService};
pub use certificate::{CertificateService, CertificateVerification, Eligibility};
pub use complaint::ComplaintService;
pub use compliance::{ComplianceService, Dashboard};
pub use event::{EventDetail, EventService, Transition};
pub use feedback::{EventFeedback, FeedbackService};
pub use instructor::InstructorService;
pub use notification::{EmailRequest, MessageTemplate, NotificationService, NotificationStats};
pub use provider::ProviderService;
pub use quiz::{QuizOutcome, QuizService};
pub use redis::{DashboardCache, RedisService};
pub use registration::RegistrationService;

use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub redis_service: RedisService,
    pub notification_service: NotificationService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub attendance_service: AttendanceService,
    pub certificate_service: CertificateService,
    pub feedback_service: FeedbackService,
    pub complaint_service: ComplaintService,
    pub compliance_service: ComplianceService,
    pub provider_service: ProviderService,
    pub instructor_service: InstructorService,
    pub quiz_service: QuizService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: DatabaseService) -> Result<Self> {
        let redis_service = RedisService::new(&settings.redis)?;
        let cache = DashboardCache::new(redis_service.clone(), settings.features.dashboard_cache);
        let notification_service = NotificationService::new(settings)?;

        Ok(Self {
            event_service: EventService::new(database.clone(), cache.clone()),
            registration_service: RegistrationService::new(database.clone(), notification_service.clone(), cache.clone()),
            attendance_service: AttendanceService::new(database.clone(), cache.clone()),
            certificate_service: CertificateService::new(
                database.clone(),
                notification_service.clone(),
                cache.clone(),
                settings.compliance.clone(),
            ),
            feedback_service: FeedbackService::new(database.clone(), cache.clone()),
            complaint_service: ComplaintService::new(database.clone(), cache.clone()),
            compliance_service: ComplianceService::new(database.clone(), cache.clone()),
            provider_service: ProviderService::new(database.clone(), cache.clone()),
            instructor_service: InstructorService::new(database.clone(), cache.clone()),
            quiz_service: QuizService::new(database.clone(), cache),
            notification_service,
            redis_service,
            database,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = crate::database::health_check(self.database.pool()).await.is_ok();
        let redis_healthy = self.redis_service.health_check().await.unwrap_or(false);

        ServiceHealthStatus {
            database_healthy,
            redis_healthy,
            email_enabled: self.notification_service.is_enabled(),
            emails: self.notification_service.get_stats(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
    pub email_enabled: bool,
    pub emails: NotificationStats,
}

impl ServiceHealthStatus {
    /// Redis only backs the dashboard cache, so the database alone decides health
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
