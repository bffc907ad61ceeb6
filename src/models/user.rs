//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription tier determining quota limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Enterprise,
}

/// A limit of -1 means unbounded.
pub const UNLIMITED: i64 = -1;

impl SubscriptionTier {
    /// Reminders allowed per calendar month
    pub fn reminder_limit(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 5,
            SubscriptionTier::Pro => UNLIMITED,
            SubscriptionTier::Enterprise => UNLIMITED,
        }
    }

    /// API calls allowed per day
    pub fn api_call_limit(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 10,
            SubscriptionTier::Pro => 100,
            SubscriptionTier::Enterprise => UNLIMITED,
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Pro => write!(f, "pro"),
            SubscriptionTier::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub bot_name: String,
    pub whatsapp_connected: bool,
    /// Digits-only phone number, see `utils::helpers::normalize_phone`
    pub whatsapp_phone: Option<String>,
    pub telegram_connected: bool,
    pub telegram_chat_id: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub reminders_count_this_month: i32,
    pub reminders_reset_at: DateTime<Utc>,
    pub api_calls_today: i32,
    pub api_calls_reset_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub bot_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_reminder_limits() {
        assert_eq!(SubscriptionTier::Free.reminder_limit(), 5);
        assert_eq!(SubscriptionTier::Pro.reminder_limit(), UNLIMITED);
        assert_eq!(SubscriptionTier::Enterprise.reminder_limit(), UNLIMITED);
    }

    #[test]
    fn test_tier_api_limits() {
        assert_eq!(SubscriptionTier::Free.api_call_limit(), 10);
        assert_eq!(SubscriptionTier::Pro.api_call_limit(), 100);
        assert_eq!(SubscriptionTier::Enterprise.api_call_limit(), UNLIMITED);
    }

    #[test]
    fn test_tier_serde_is_lowercase() {
        let json = serde_json::to_string(&SubscriptionTier::Pro).unwrap();
        assert_eq!(json, "\"pro\"");
        let tier: SubscriptionTier = serde_json::from_str("\"enterprise\"").unwrap();
        assert_eq!(tier, SubscriptionTier::Enterprise);
    }
}
