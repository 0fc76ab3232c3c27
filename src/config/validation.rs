//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{AceError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;
    validate_rate_limit_config(&settings.rate_limit)?;

    match settings.mailgun {
        Some(ref mailgun_config) => validate_mailgun_config(mailgun_config)?,
        None if settings.features.email_notifications => {
            return Err(AceError::Config(
                "Mailgun configuration is required when email notifications are enabled".to_string()
            ));
        }
        None => {}
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(AceError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(AceError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(AceError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(AceError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(AceError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(AceError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate token configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(AceError::Config(
            "JWT secret is required".to_string()
        ));
    }

    if config.jwt_secret.len() < 32 {
        return Err(AceError::Config(
            "JWT secret must be at least 32 characters".to_string()
        ));
    }

    if config.token_ttl_minutes <= 0 {
        return Err(AceError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate Mailgun configuration
fn validate_mailgun_config(config: &super::MailgunConfig) -> Result<()> {
    if config.api_base_url.is_empty() {
        return Err(AceError::Config(
            "Mailgun API URL is required".to_string()
        ));
    }

    if config.domain.is_empty() || config.api_key.is_empty() {
        return Err(AceError::Config(
            "Mailgun domain and API key are required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(AceError::Config(
            "Mailgun timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(AceError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(AceError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate rate limiting configuration
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(AceError::Config(
            "Rate limit must allow at least one request per minute".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailgunConfig;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        settings
    }

    #[test]
    fn test_default_settings_need_secret() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_pool_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_email_requires_mailgun() {
        let mut settings = valid_settings();
        settings.features.email_notifications = true;
        assert!(validate_settings(&settings).is_err());

        settings.mailgun = Some(MailgunConfig {
            api_base_url: "https://api.mailgun.net".to_string(),
            domain: "mg.behaviorschool.com".to_string(),
            api_key: "key-123".to_string(),
            sender: "Behavior School <ace@behaviorschool.com>".to_string(),
            timeout_seconds: 10,
        });
        assert!(validate_settings(&settings).is_ok());
    }
}
