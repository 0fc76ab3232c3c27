//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod participant;
pub mod provider;
pub mod event;
pub mod registration;
pub mod attendance;
pub mod certificate;
pub mod feedback;
pub mod complaint;
pub mod instructor;
pub mod quiz;

// Re-export repositories
pub use participant::ParticipantRepository;
pub use provider::ProviderRepository;
pub use event::EventRepository;
pub use registration::{RegistrationRepository, NewRegistration};
pub use attendance::AttendanceRepository;
pub use certificate::{CertificateRepository, NewCertificate};
pub use feedback::{FeedbackRepository, NewFeedback};
pub use complaint::{ComplaintRepository, NewComplaint};
pub use instructor::InstructorRepository;
pub use quiz::{QuizRepository, NewSubmission};
