//! Error handling for Remindr
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Main error type for the Remindr backend
#[derive(Error, Debug)]
pub enum RemindrError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing, expired or malformed identity token. Deliberately carries no
    /// detail so all token failures are indistinguishable to the caller.
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    /// The platform identity has no account binding. Distinct from
    /// `Unauthenticated` so chat flows can prompt "connect first".
    #[error("User not connected. Please connect your account first.")]
    UserNotConnected,

    #[error("Reminder not found: {reminder_id}")]
    ReminderNotFound { reminder_id: Uuid },

    #[error("Quota exceeded: {used}/{limit} used, resets at {reset_at}")]
    QuotaExceeded {
        limit: i64,
        used: i64,
        reset_at: DateTime<Utc>,
    },

    #[error("{message}")]
    ParseFailure { message: String, hint: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Gemini parsing backend specific errors
#[derive(Error, Debug)]
pub enum ParserBackendError {
    #[error("Parser API request failed: {0}")]
    RequestFailed(String),

    #[error("Parser API timeout")]
    Timeout,

    #[error("Invalid parser response: {0}")]
    InvalidResponse(String),

    #[error("Parser service unavailable")]
    ServiceUnavailable,
}

/// Result type alias for Remindr operations
pub type Result<T> = std::result::Result<T, RemindrError>;

impl RemindrError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            RemindrError::Database(_) => false,
            RemindrError::Migration(_) => false,
            RemindrError::Http(_) => true,
            RemindrError::Serialization(_) => false,
            RemindrError::Io(_) => true,
            RemindrError::Config(_) => false,
            RemindrError::Unauthenticated => false,
            RemindrError::UserNotFound { .. } => false,
            RemindrError::UserNotConnected => false,
            RemindrError::ReminderNotFound { .. } => false,
            RemindrError::QuotaExceeded { .. } => true,
            RemindrError::ParseFailure { .. } => true,
            RemindrError::InvalidStateTransition { .. } => false,
            RemindrError::InvalidInput(_) => false,
            RemindrError::ServiceUnavailable(_) => true,
        }
    }

    /// HTTP status code for this error when surfaced at a route boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            RemindrError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RemindrError::UserNotFound { .. }
            | RemindrError::UserNotConnected
            | RemindrError::ReminderNotFound { .. } => StatusCode::NOT_FOUND,
            RemindrError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            RemindrError::ParseFailure { .. }
            | RemindrError::InvalidInput(_)
            | RemindrError::InvalidStateTransition { .. } => StatusCode::BAD_REQUEST,
            RemindrError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RemindrError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error while handling request");
            // Internal detail stays in the logs
            let body = serde_json::json!({ "error": "Server error" });
            return (status, Json(body)).into_response();
        }

        let body = match &self {
            RemindrError::QuotaExceeded {
                limit,
                used,
                reset_at,
            } => serde_json::json!({
                "error": self.to_string(),
                "limit": limit,
                "used": used,
                "resetAt": reset_at,
            }),
            RemindrError::ParseFailure { message, hint } => serde_json::json!({
                "error": message,
                "hint": hint,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_are_uniform() {
        // Every token problem maps to the same opaque 401
        let err = RemindrError::Unauthenticated;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_not_found_is_distinct_from_unauthenticated() {
        let not_connected = RemindrError::UserNotConnected;
        assert_eq!(not_connected.status_code(), StatusCode::NOT_FOUND);
        assert_ne!(
            not_connected.status_code(),
            RemindrError::Unauthenticated.status_code()
        );
    }

    #[test]
    fn test_quota_exceeded_is_recoverable() {
        let err = RemindrError::QuotaExceeded {
            limit: 5,
            used: 5,
            reset_at: Utc::now(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}
