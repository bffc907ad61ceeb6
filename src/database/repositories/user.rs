//! User repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUserRequest, User};
use crate::utils::errors::RemindrError;

const USER_COLUMNS: &str = "id, email, bot_name, whatsapp_connected, whatsapp_phone, \
    telegram_connected, telegram_chat_id, subscription_tier, reminders_count_this_month, \
    reminders_reset_at, api_calls_today, api_calls_reset_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user (account creation itself happens via web signup;
    /// this exists for that collaborator and for test fixtures)
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, bot_name, created_at, updated_at)
            VALUES ($1, COALESCE($2, 'Remindr Bot'), $3, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.email)
        .bind(request.bot_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram chat ID
    pub async fn find_by_telegram_chat_id(
        &self,
        chat_id: &str,
    ) -> Result<Option<User>, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_chat_id = $1"
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by normalized WhatsApp phone number
    pub async fn find_by_whatsapp_phone(
        &self,
        phone: &str,
    ) -> Result<Option<User>, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE whatsapp_phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Bind a Telegram chat ID to an account.
    ///
    /// The partial unique index on `telegram_chat_id` rejects a concurrent
    /// bind of the same identity; the caller maps that violation.
    pub async fn bind_telegram(
        &self,
        user_id: Uuid,
        chat_id: &str,
    ) -> Result<Option<User>, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET telegram_connected = TRUE, telegram_chat_id = $2, updated_at = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(chat_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Bind a WhatsApp phone number (digits only) to an account
    pub async fn bind_whatsapp(
        &self,
        user_id: Uuid,
        phone: &str,
    ) -> Result<Option<User>, RemindrError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET whatsapp_connected = TRUE, whatsapp_phone = $2, updated_at = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Reset the monthly reminder counter if it belongs to a prior period.
    ///
    /// Single conditional UPDATE so concurrent checks cannot double-reset.
    /// Returns true when a stale counter was actually reset.
    pub async fn reset_reminder_counter_if_stale(
        &self,
        user_id: Uuid,
        period_start: DateTime<Utc>,
    ) -> Result<bool, RemindrError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reminders_count_this_month = 0, reminders_reset_at = $2, updated_at = $3
            WHERE id = $1 AND reminders_reset_at < $2
            "#,
        )
        .bind(user_id)
        .bind(period_start)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the monthly reminder counter
    pub async fn increment_reminder_count(&self, user_id: Uuid) -> Result<(), RemindrError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reminders_count_this_month = reminders_count_this_month + 1, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reset the daily API counter if it belongs to a prior period
    pub async fn reset_api_counter_if_stale(
        &self,
        user_id: Uuid,
        period_start: DateTime<Utc>,
    ) -> Result<bool, RemindrError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET api_calls_today = 0, api_calls_reset_at = $2, updated_at = $3
            WHERE id = $1 AND api_calls_reset_at < $2
            "#,
        )
        .bind(user_id)
        .bind(period_start)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the daily API counter
    pub async fn increment_api_count(&self, user_id: Uuid) -> Result<(), RemindrError> {
        sqlx::query(
            r#"
            UPDATE users
            SET api_calls_today = api_calls_today + 1, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
