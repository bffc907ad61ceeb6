//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{RemindrError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_parser_config(&settings.parser)?;
    validate_auth_config(&settings.auth)?;
    validate_intake_config(&settings.intake)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(RemindrError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(RemindrError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(RemindrError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate parser backend configuration
fn validate_parser_config(config: &super::ParserConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(RemindrError::Config(
            "Parser API URL is required".to_string(),
        ));
    }

    if config.api_key.is_empty() {
        return Err(RemindrError::Config(
            "Parser API key is required".to_string(),
        ));
    }

    if config.model.is_empty() {
        return Err(RemindrError::Config(
            "Parser model name is required".to_string(),
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(RemindrError::Config(
            "Parser timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate auth configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(RemindrError::Config("JWT secret is required".to_string()));
    }

    Ok(())
}

/// Validate intake defaults
fn validate_intake_config(config: &super::IntakeConfig) -> Result<()> {
    if config.default_timezone.parse::<chrono_tz::Tz>().is_err() {
        return Err(RemindrError::Config(format!(
            "Unknown default timezone: {}",
            config.default_timezone
        )));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(RemindrError::Config(
            "Logging level is required".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.parser.api_key = "test-key".to_string();
        settings.auth.jwt_secret = "test-secret".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_api_key_fails() {
        let mut settings = valid_settings();
        settings.parser.api_key.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_jwt_secret_fails() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bogus_timezone_fails() {
        let mut settings = valid_settings();
        settings.intake.default_timezone = "Mars/Olympus_Mons".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_connection_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        settings.database.max_connections = 10;
        assert!(validate_settings(&settings).is_err());
    }
}
