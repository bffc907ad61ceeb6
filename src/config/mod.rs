//! Configuration module
//!
//! This module handles application configuration loading and validation

pub mod settings;
pub mod validation;

// Re-export commonly used configuration types
pub use settings::{
    AuthConfig, DatabaseConfig, IntakeConfig, LoggingConfig, ParserConfig, ServerConfig,
    Settings,
};
