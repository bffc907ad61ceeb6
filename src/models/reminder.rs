//! Reminder model and its delivery state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Chat platform the reminder is delivered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Whatsapp,
    Telegram,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Whatsapp => write!(f, "whatsapp"),
            Platform::Telegram => write!(f, "telegram"),
        }
    }
}

/// Delivery state of a reminder.
///
/// `pending` reminders are picked up by the external dispatcher once due;
/// the dispatcher reports back `sent` or `failed`. Users may cancel before
/// delivery. A failed delivery may be retried and later marked sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

impl ReminderStatus {
    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// `sent` and `cancelled` are terminal. `failed` may still move to
    /// `sent` (dispatcher retry) or `cancelled` (user gives up).
    pub fn can_transition_to(&self, to: ReminderStatus) -> bool {
        match self {
            ReminderStatus::Pending => to != ReminderStatus::Pending,
            ReminderStatus::Failed => {
                matches!(to, ReminderStatus::Sent | ReminderStatus::Cancelled)
            }
            ReminderStatus::Sent | ReminderStatus::Cancelled => false,
        }
    }
}

impl std::fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderStatus::Pending => write!(f, "pending"),
            ReminderStatus::Sent => write!(f, "sent"),
            ReminderStatus::Failed => write!(f, "failed"),
            ReminderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    /// Absolute delivery time, UTC-normalized from the user's local date+time
    pub reminder_time: DateTime<Utc>,
    pub platform: Platform,
    pub status: ReminderStatus,
    pub location: Option<String>,
    /// Non-null iff `status == sent`
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    pub user_id: Uuid,
    pub message: String,
    pub reminder_time: DateTime<Utc>,
    pub platform: Platform,
    pub location: Option<String>,
}

/// A due reminder joined with the owner's contact fields, so the dispatcher
/// can deliver without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DueReminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub reminder_time: DateTime<Utc>,
    pub platform: Platform,
    pub status: ReminderStatus,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub telegram_chat_id: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub bot_name: String,
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_move_to_any_other_state() {
        let pending = ReminderStatus::Pending;
        assert!(pending.can_transition_to(ReminderStatus::Sent));
        assert!(pending.can_transition_to(ReminderStatus::Failed));
        assert!(pending.can_transition_to(ReminderStatus::Cancelled));
        assert!(!pending.can_transition_to(ReminderStatus::Pending));
    }

    #[test]
    fn test_failed_can_be_retried_or_cancelled() {
        let failed = ReminderStatus::Failed;
        assert!(failed.can_transition_to(ReminderStatus::Sent));
        assert!(failed.can_transition_to(ReminderStatus::Cancelled));
        assert!(!failed.can_transition_to(ReminderStatus::Pending));
        assert!(!failed.can_transition_to(ReminderStatus::Failed));
    }

    #[test]
    fn test_sent_and_cancelled_are_terminal() {
        for terminal in [ReminderStatus::Sent, ReminderStatus::Cancelled] {
            for to in [
                ReminderStatus::Pending,
                ReminderStatus::Sent,
                ReminderStatus::Failed,
                ReminderStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReminderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        let status: ReminderStatus = serde_json::from_str("\"sent\"").unwrap();
        assert_eq!(status, ReminderStatus::Sent);
    }

    #[test]
    fn test_platform_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Whatsapp).unwrap(),
            "\"whatsapp\""
        );
    }
}
