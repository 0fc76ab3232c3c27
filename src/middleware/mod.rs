//! Middleware module
//!
//! This module contains middleware for request processing

pub mod auth;
pub mod logging;
pub mod rate_limit;

// Re-export commonly used middleware
pub use auth::{Admin, AuthUser, Claims, Coordinator, JwtAuth};
pub use logging::{assign_request_id, trace_layer, RequestId};
pub use rate_limit::{enforce_rate_limit, RateLimiter};
