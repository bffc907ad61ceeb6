//! Utility modules
//!
//! This module contains utility functions and common functionality

pub mod errors;
pub mod helpers;
pub mod logging;

// Re-export commonly used utilities
pub use errors::{RemindrError, Result};
