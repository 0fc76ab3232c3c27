//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub mailgun: Option<MailgunConfig>,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub compliance: ComplianceConfig,
    pub features: FeaturesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Token verification for coordinator and admin routes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub token_ttl_minutes: i64,
}

/// Mailgun configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailgunConfig {
    pub api_base_url: String,
    pub domain: String,
    pub api_key: String,
    pub sender: String,
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub json: bool,
}

/// Public endpoint throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
    /// Key clients by `x-forwarded-for`/`x-real-ip`; only safe behind a proxy that sets them
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

/// Values printed on certificates and used as fallbacks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComplianceConfig {
    pub default_instructor_name: String,
    pub default_provider_name: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub email_notifications: bool,
    pub dashboard_cache: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("ACEDESK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::AceError> {
        super::validation::validate_settings(self)
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/acedesk".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "acedesk:".to_string(),
                ttl_seconds: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                issuer: "acedesk".to_string(),
                token_ttl_minutes: 60,
            },
            mailgun: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: 30,
                burst: 10,
                trust_proxy_headers: false,
            },
            compliance: ComplianceConfig {
                default_instructor_name: "Rob Spain, M.S., BCBA, IBA".to_string(),
                default_provider_name: "Behavior School".to_string(),
            },
            features: FeaturesConfig {
                email_notifications: false,
                dashboard_cache: false,
            },
        }
    }
}
