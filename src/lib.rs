//! AceDesk
//!
//! Back-office service for an ACE continuing-education provider: event
//! catalogue and lifecycle, registrations, attendance, quizzes, feedback,
//! certificates, complaints and the compliance dashboard that ties them
//! together. The pure rules live in [`compliance`]; [`services`] wires them
//! to Postgres and Redis, and [`handlers`] exposes them over HTTP.

#![allow(non_snake_case)]

pub mod compliance;
pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{AceError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
