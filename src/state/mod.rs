//! Shared application state
//!
//! One [`AppState`] is built at startup and cloned into every request
//! handler.

use std::sync::Arc;
use axum::extract::FromRef;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::auth::JwtAuth;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub services: ServiceFactory,
    pub auth: JwtAuth,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(settings: Settings, database: DatabaseService) -> Result<Self> {
        let services = ServiceFactory::new(&settings, database)?;
        let auth = JwtAuth::new(&settings.auth);
        let rate_limiter = RateLimiter::new(RateLimitConfig::from(&settings.rate_limit));

        Ok(Self {
            settings: Arc::new(settings),
            services,
            auth,
            rate_limiter,
        })
    }
}

impl FromRef<AppState> for JwtAuth {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
