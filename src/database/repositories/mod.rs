//! Database repositories module
//!
//! This module contains repository implementations for data access

pub mod reminder;
pub mod user;

// Re-export repositories
pub use reminder::ReminderRepository;
pub use user::UserRepository;
