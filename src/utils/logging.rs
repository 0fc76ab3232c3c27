//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the AceDesk application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{AceError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender on drop and must be kept
/// alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| AceError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.file_path {
        Some(path) if !path.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(path, "acedesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AceError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event status transitions
pub fn log_event_transition(event_id: i64, from: &str, to: &str, actor: Option<&str>) {
    info!(
        event_id = event_id,
        from = from,
        to = to,
        actor = actor,
        "Event status changed"
    );
}

/// Log attendance actions
pub fn log_attendance_action(event_id: i64, participant_id: i64, action: &str) {
    info!(
        event_id = event_id,
        participant_id = participant_id,
        action = action,
        "Attendance action recorded"
    );
}

/// Log certificate lifecycle actions
pub fn log_certificate_action(certificate_number: &str, action: &str, details: Option<&str>) {
    info!(
        certificate_number = certificate_number,
        action = action,
        details = details,
        "Certificate action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin: &str, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin = admin,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
