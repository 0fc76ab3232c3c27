//! Database service layer
//!
//! This module provides a high-level interface to database operations

use std::collections::HashMap;
use crate::compliance::ProviderSnapshot;
use crate::database::repositories::*;
use crate::database::DatabasePool;
use crate::utils::errors::AceError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub participants: ParticipantRepository,
    pub providers: ProviderRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub attendance: AttendanceRepository,
    pub certificates: CertificateRepository,
    pub feedback: FeedbackRepository,
    pub complaints: ComplaintRepository,
    pub instructors: InstructorRepository,
    pub quizzes: QuizRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            participants: ParticipantRepository::new(pool.clone()),
            providers: ProviderRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            certificates: CertificateRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool.clone()),
            complaints: ComplaintRepository::new(pool.clone()),
            instructors: InstructorRepository::new(pool.clone()),
            quizzes: QuizRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Load every record the compliance rules need for one provider
    ///
    /// Returns `None` when the provider does not exist.
    pub async fn load_provider_snapshot(&self, provider_id: i64) -> Result<Option<ProviderSnapshot>, AceError> {
        let Some(provider) = self.providers.find_by_id(provider_id).await? else {
            return Ok(None);
        };

        let events = self.events.list_by_provider(provider_id).await?;
        let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();

        let (certificates, feedback, attendance, registrations, quizzes, quiz_submissions, event_instructors) = tokio::try_join!(
            self.certificates.list_by_provider(provider_id),
            self.feedback.list_by_events(&event_ids),
            self.attendance.list_by_events(&event_ids),
            self.registrations.list_by_events(&event_ids),
            self.quizzes.list_by_events(&event_ids),
            self.quizzes.submissions_by_events(&event_ids),
            self.events.instructors_for_events(&event_ids),
        )?;

        // Complaints are optional for scoring; an unavailable table counts as none
        let complaints = match self.complaints.list_by_provider(provider_id).await {
            Ok(complaints) => complaints,
            Err(e) => {
                tracing::warn!(provider_id, error = %e, "Failed to load complaints, continuing without them");
                Vec::new()
            }
        };

        let qualifications = self.instructors.list_by_provider(provider_id).await?;

        let mut people_ids: Vec<i64> = qualifications
            .iter()
            .map(|q| q.user_id)
            .chain(event_instructors.iter().map(|i| i.user_id))
            .chain(std::iter::once(provider.coordinator_id))
            .collect();
        people_ids.sort_unstable();
        people_ids.dedup();

        let people: HashMap<i64, _> = self
            .participants
            .find_many(&people_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let coordinator = people.get(&provider.coordinator_id).cloned();

        Ok(Some(ProviderSnapshot {
            provider,
            coordinator,
            events,
            certificates,
            complaints,
            feedback,
            attendance,
            registrations,
            quizzes,
            quiz_submissions,
            event_instructors,
            qualifications,
            people,
        }))
    }
}
