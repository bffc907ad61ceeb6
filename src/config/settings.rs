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
    pub parser: ParserConfig,
    pub auth: AuthConfig,
    pub intake: IntakeConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Gemini parsing backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// Dashboard token authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Message-intake defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
    /// Timezone assumed when a request carries none
    pub default_timezone: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("REMINDR").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::RemindrError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/remindr".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            parser: ParserConfig {
                api_url: "https://generativelanguage.googleapis.com".to_string(),
                api_key: String::new(),
                model: "gemini-1.5-flash".to_string(),
                timeout_seconds: 15,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
            },
            intake: IntakeConfig {
                default_timezone: "Asia/Kolkata".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/remindr".to_string(),
            },
        }
    }
}
