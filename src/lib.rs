//! Remindr backend
//!
//! Reminder-bot backend core: users connect a chat platform (WhatsApp or
//! Telegram) to an account, send natural-language messages that get parsed
//! into scheduled reminders, and an external dispatch worker polls for due
//! reminders and reports delivery status back.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{RemindrError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
