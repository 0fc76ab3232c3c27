//! Error handling for AceDesk
//!
//! This module defines the main error type used throughout the application,
//! its mapping onto HTTP responses, and the helper error types of the
//! outbound integrations.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for AceDesk
#[derive(Error, Debug)]
pub enum AceError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Record already exists")]
    Duplicate { constraint: Option<String> },

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Mail delivery error: {0}")]
    Mail(#[from] MailError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot transition from \"{from_label}\" to \"{to_label}\". Allowed transitions from \"{from_label}\": {allowed_labels}")]
    InvalidStateTransition {
        from: String,
        to: String,
        from_label: String,
        to_label: String,
        allowed: Vec<String>,
        allowed_labels: String,
    },

    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    AlreadyRegistered { message: String, confirmation_code: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Mailgun API specific errors
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mailgun request failed: {0}")]
    RequestFailed(String),

    #[error("Mailgun rejected the message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Missing template parameter: {0}")]
    MissingParameter(String),
}

impl From<sqlx::Error> for AceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => AceError::Duplicate {
                constraint: db.constraint().map(str::to_string),
            },
            _ => AceError::Database(err),
        }
    }
}

impl From<JsonRejection> for AceError {
    fn from(rejection: JsonRejection) -> Self {
        AceError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AceError {
    fn from(rejection: PathRejection) -> Self {
        AceError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AceError {
    fn from(rejection: QueryRejection) -> Self {
        AceError::validation(rejection.body_text())
    }
}

/// Result type alias for AceDesk operations
pub type Result<T> = std::result::Result<T, AceError>;

/// Result type alias for mail operations
pub type MailResult<T> = std::result::Result<T, MailError>;

impl AceError {
    /// Build a not-found error for the given entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AceError::NotFound { entity, id: id.to_string() }
    }

    /// Whether this is a unique violation of the named constraint
    pub fn is_duplicate_of(&self, name: &str) -> bool {
        matches!(self, AceError::Duplicate { constraint: Some(c) } if c == name)
    }

    /// Build a validation error carrying a single message
    pub fn validation(message: impl Into<String>) -> Self {
        AceError::Validation { message: message.into(), errors: Vec::new() }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            AceError::Database(_) => false,
            AceError::Migration(_) => false,
            AceError::Mail(_) => true,
            AceError::Config(_) => false,
            AceError::PermissionDenied(_) => false,
            AceError::NotFound { .. } => false,
            AceError::InvalidStateTransition { .. } => false,
            AceError::Validation { .. } => false,
            AceError::Conflict(_) => false,
            AceError::Duplicate { .. } => false,
            AceError::AlreadyRegistered { .. } => false,
            AceError::Redis(_) => true,
            AceError::Http(_) => true,
            AceError::Serialization(_) => false,
            AceError::Io(_) => true,
            AceError::UrlParse(_) => false,
            AceError::Authentication(_) => false,
            AceError::RateLimitExceeded => true,
            AceError::InvalidInput(_) => false,
            AceError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AceError::Database(_) => ErrorSeverity::Critical,
            AceError::Migration(_) => ErrorSeverity::Critical,
            AceError::Config(_) => ErrorSeverity::Critical,
            AceError::PermissionDenied(_) => ErrorSeverity::Warning,
            AceError::Authentication(_) => ErrorSeverity::Warning,
            AceError::RateLimitExceeded => ErrorSeverity::Warning,
            AceError::InvalidInput(_)
            | AceError::Validation { .. }
            | AceError::InvalidStateTransition { .. }
            | AceError::NotFound { .. }
            | AceError::Conflict(_)
            | AceError::Duplicate { .. }
            | AceError::AlreadyRegistered { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AceError::InvalidInput(_)
            | AceError::Validation { .. }
            | AceError::InvalidStateTransition { .. } => StatusCode::BAD_REQUEST,
            AceError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AceError::NotFound { .. } => StatusCode::NOT_FOUND,
            AceError::Conflict(_) | AceError::Duplicate { .. } | AceError::AlreadyRegistered { .. } => {
                StatusCode::CONFLICT
            }
            AceError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AceError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AceError::Validation { message, errors } if !errors.is_empty() => json!({
                "error": message,
                "validation_errors": errors,
            }),
            AceError::InvalidStateTransition { from, to, allowed, .. } => json!({
                "error": self.to_string(),
                "current_status": from,
                "requested_status": to,
                "allowed_transitions": allowed,
            }),
            AceError::AlreadyRegistered { message, confirmation_code } => json!({
                "error": message,
                "confirmation_code": confirmation_code,
            }),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                super::logging::log_api_error("http", &self.to_string(), None);
                json!({ "error": "An unexpected error occurred" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(status, StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE) {
            response
                .headers_mut()
                .insert("retry-after", HeaderValue::from_static("30"));
        }
        response
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AceError::not_found("Event", 7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AceError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AceError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AceError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AceError::Authentication("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_duplicate_is_conflict() {
        let err = AceError::Duplicate { constraint: Some("certificates_certificate_number_key".into()) };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.is_duplicate_of("certificates_certificate_number_key"));
        assert!(!err.is_duplicate_of("registrations_confirmation_code_key"));
        assert!(!AceError::Conflict("dup".into()).is_duplicate_of("certificates_certificate_number_key"));
    }

    #[test]
    fn test_not_found_message() {
        let err = AceError::not_found("Provider", 12);
        assert_eq!(err.to_string(), "Provider not found");
        assert_eq!(err.severity(), ErrorSeverity::Info);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_rate_limit_response_has_retry_after() {
        let response = AceError::RateLimitExceeded.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
    }

    #[test]
    fn test_already_registered_is_conflict() {
        let err = AceError::AlreadyRegistered {
            message: "Already registered for this event".into(),
            confirmation_code: "ABCD2345".into(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Already registered for this event");
    }
}
