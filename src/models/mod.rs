//! Data models module
//!
//! This module contains all data structures used throughout the application

use thiserror::Error;

/// Raised when a stored or submitted status string has no matching variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a string-backed enum stored as TEXT.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and `TryFrom<String>` so
/// rows can decode the column with `#[sqlx(try_from = "String")]`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::ParseEnumError;

            fn try_from(value: String) -> ::std::result::Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use text_enum;

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

// Re-export commonly used models
pub use participant::{Participant, CreateParticipantRequest, UserRole};
pub use provider::{Provider, ProviderType, CreateProviderRequest, UpdateProviderRequest, RecordPaymentRequest, PaymentType, ProviderStats};
pub use event::{Event, EventStatus, CeCategory, Modality, EventType, EventSubtype, VerificationMethod, CreateEventRequest, UpdateEventRequest, ChangeStatusRequest, EventFilter, EventInstructor, InstructorRole, AssignInstructorRequest};
pub use registration::{Registration, RegistrationStatus, RegisterRequest, CompletionUpdate};
pub use attendance::{AttendanceRecord, AttendanceAction, RecordAttendanceRequest, VerifyAttendanceRequest};
pub use certificate::{Certificate, CertificateStatus, IssueCertificateRequest, RevokeCertificateRequest, UpdateCertificateRequest};
pub use feedback::{FeedbackResponse, SubmitFeedbackRequest, ReviewFeedbackRequest};
pub use complaint::{Complaint, ComplaintStatus, SubmitComplaintRequest, UpdateComplaintRequest};
pub use instructor::{InstructorQualification, QualificationPath, ExpertiseBasis, SubmitQualificationRequest, ReviewQualificationRequest};
pub use quiz::{Quiz, QuizQuestion, QuizSubmission, QuestionType, QuestionOption, CreateQuizRequest, AddQuestionRequest, SubmitQuizRequest};
