//! Reminder repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::reminder::{
    CreateReminderRequest, DueReminder, Reminder, ReminderStatus,
};
use crate::utils::errors::RemindrError;

const REMINDER_COLUMNS: &str =
    "id, user_id, message, reminder_time, platform, status, location, sent_at, created_at";

/// Joined columns for dispatcher queries: the reminder plus the owner's
/// contact fields.
const DUE_COLUMNS: &str = "r.id, r.user_id, r.message, r.reminder_time, r.platform, \
    r.status, r.location, r.created_at, u.telegram_chat_id, u.whatsapp_phone, \
    u.bot_name, u.email AS user_email";

#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new reminder in `pending` state
    pub async fn create(&self, request: CreateReminderRequest) -> Result<Reminder, RemindrError> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            INSERT INTO reminders (user_id, message, reminder_time, platform, status, location, created_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(request.message)
        .bind(request.reminder_time)
        .bind(request.platform)
        .bind(request.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(reminder)
    }

    /// Find reminder by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reminder>, RemindrError> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    /// List a user's pending reminders, soonest first
    pub async fn list_pending(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Reminder>, RemindrError> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            SELECT {REMINDER_COLUMNS} FROM reminders
            WHERE user_id = $1 AND status = 'pending'
            ORDER BY reminder_time ASC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    /// List all of a user's reminders, newest first (dashboard view)
    pub async fn list_all(&self, user_id: Uuid) -> Result<Vec<Reminder>, RemindrError> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            SELECT {REMINDER_COLUMNS} FROM reminders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    /// Update a reminder's status. `sent_at` is stored as given; the service
    /// layer decides it (now iff the new status is `sent`, else null).
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ReminderStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Reminder>, RemindrError> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            UPDATE reminders
            SET status = $2, sent_at = $3
            WHERE id = $1
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(sent_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    /// Hard-delete a reminder, scoped to its owner.
    ///
    /// Returns the number of rows removed; deleting someone else's reminder
    /// affects zero rows and is not an error.
    pub async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<u64, RemindrError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Fetch due reminders (pending, scheduled at or before `now`) with the
    /// owner's contact fields attached, soonest first.
    pub async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DueReminder>, RemindrError> {
        let reminders = sqlx::query_as::<_, DueReminder>(&format!(
            r#"
            SELECT {DUE_COLUMNS}
            FROM reminders r
            JOIN users u ON u.id = r.user_id
            WHERE r.status = 'pending' AND r.reminder_time <= $1
            ORDER BY r.reminder_time ASC
            LIMIT $2
            "#
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    /// Fetch a single reminder joined with contact fields, for the
    /// dispatcher push-back response.
    pub async fn find_with_contact(
        &self,
        id: Uuid,
    ) -> Result<Option<DueReminder>, RemindrError> {
        let reminder = sqlx::query_as::<_, DueReminder>(&format!(
            r#"
            SELECT {DUE_COLUMNS}
            FROM reminders r
            JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }
}
