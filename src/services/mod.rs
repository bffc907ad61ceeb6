//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod identity;
pub mod parser;
pub mod quota;
pub mod reminder;

// Re-export commonly used services
pub use auth::{AuthService, Session};
pub use identity::{ConnectOutcome, IdentityService, PlatformIdentity};
pub use parser::{ParsedReminderIntent, ReminderParser};
pub use quota::{QuotaService, RateLimitStatus};
pub use reminder::ReminderService;

use chrono_tz::Tz;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::{RemindrError, Result};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub identity_service: IdentityService,
    pub quota_service: QuotaService,
    pub parser_service: ReminderParser,
    pub reminder_service: ReminderService,
    pub default_timezone: Tz,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: &DatabaseService) -> Result<Self> {
        let default_timezone = settings
            .intake
            .default_timezone
            .parse::<Tz>()
            .map_err(|e| RemindrError::Config(format!("Invalid default timezone: {}", e)))?;

        let auth_service = AuthService::new(&settings.auth);
        let identity_service = IdentityService::new(database.users.clone());
        let quota_service = QuotaService::new(database.users.clone());
        let parser_service = ReminderParser::new(settings.parser.clone(), default_timezone)?;
        let reminder_service =
            ReminderService::new(database.reminders.clone(), quota_service.clone());

        Ok(Self {
            auth_service,
            identity_service,
            quota_service,
            parser_service,
            reminder_service,
            default_timezone,
        })
    }
}
