//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod reminder;
pub mod user;

// Re-export commonly used models
pub use reminder::{
    CreateReminderRequest, DueReminder, Platform, Reminder, ReminderStatus,
};
pub use user::{CreateUserRequest, SubscriptionTier, User, UNLIMITED};
