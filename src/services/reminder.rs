//! Reminder lifecycle management
//!
//! Creates, lists, cancels and transitions reminders through their status
//! state machine. Creation is gated by the quota tracker; status updates
//! come from the external dispatcher's callback.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::repositories::ReminderRepository;
use crate::models::reminder::{
    CreateReminderRequest, DueReminder, Reminder, ReminderStatus,
};
use crate::services::quota::{QuotaService, RateLimitStatus};
use crate::utils::errors::{RemindrError, Result};

/// Page size for the chat-listing flow
pub const PENDING_PAGE_SIZE: i64 = 10;

/// Maximum due reminders handed to the dispatcher per poll
pub const DUE_BATCH_SIZE: i64 = 50;

/// Reminder lifecycle service
#[derive(Debug, Clone)]
pub struct ReminderService {
    reminders: ReminderRepository,
    quota: QuotaService,
}

impl ReminderService {
    /// Create a new ReminderService instance
    pub fn new(reminders: ReminderRepository, quota: QuotaService) -> Self {
        Self { reminders, quota }
    }

    /// Create a reminder in `pending` state.
    ///
    /// The quota check runs first and a denial rejects the request with
    /// `QuotaExceeded` before anything is written. On success the monthly
    /// counter is bumped. Not idempotent: a retry after a timeout can
    /// double-create; callers dedupe at the bot/UI layer.
    pub async fn create(
        &self,
        request: CreateReminderRequest,
    ) -> Result<(Reminder, RateLimitStatus)> {
        let quota = self.quota.enforce_reminder_limit(request.user_id).await?;

        let reminder = self.reminders.create(request).await?;
        self.quota.increment_reminder_count(reminder.user_id).await?;

        info!(
            reminder_id = %reminder.id,
            user_id = %reminder.user_id,
            reminder_time = %reminder.reminder_time,
            platform = %reminder.platform,
            "Reminder created"
        );

        Ok((reminder, quota))
    }

    /// A user's pending reminders, soonest first, one chat page
    pub async fn list_pending(&self, user_id: Uuid) -> Result<Vec<Reminder>> {
        self.reminders.list_pending(user_id, PENDING_PAGE_SIZE).await
    }

    /// All of a user's reminders, newest first (dashboard view)
    pub async fn list_all(&self, user_id: Uuid) -> Result<Vec<Reminder>> {
        self.reminders.list_all(user_id).await
    }

    /// Cancel a reminder.
    ///
    /// Only legal from `pending` or `failed`; cancelling an already-sent
    /// reminder is rejected rather than silently rewriting history.
    pub async fn cancel(&self, reminder_id: Uuid) -> Result<Reminder> {
        self.transition(reminder_id, ReminderStatus::Cancelled)
            .await?;

        let reminder = self
            .reminders
            .find_by_id(reminder_id)
            .await?
            .ok_or(RemindrError::ReminderNotFound { reminder_id })?;

        info!(reminder_id = %reminder_id, "Reminder cancelled");
        Ok(reminder)
    }

    /// Hard-delete a reminder, scoped to the requesting owner.
    ///
    /// Deleting another user's reminder affects zero rows and reports
    /// success, indistinguishable from "nothing to delete", so reminder ids
    /// cannot be probed for existence.
    pub async fn delete(&self, reminder_id: Uuid, user_id: Uuid) -> Result<()> {
        let removed = self.reminders.delete_owned(reminder_id, user_id).await?;
        debug!(
            reminder_id = %reminder_id,
            user_id = %user_id,
            removed = removed,
            "Reminder delete requested"
        );
        Ok(())
    }

    /// Apply a dispatcher status callback. `sent_at` is set to now iff the
    /// new status is `sent`, cleared otherwise. Returns the updated reminder
    /// joined with the owner's contact fields.
    pub async fn mark_status(
        &self,
        reminder_id: Uuid,
        status: ReminderStatus,
    ) -> Result<DueReminder> {
        self.transition(reminder_id, status).await?;

        let reminder = self
            .reminders
            .find_with_contact(reminder_id)
            .await?
            .ok_or(RemindrError::ReminderNotFound { reminder_id })?;

        info!(reminder_id = %reminder_id, status = %status, "Reminder status updated");
        Ok(reminder)
    }

    /// Due reminders for the dispatcher: pending, scheduled at or before
    /// `now`, soonest first, with contact fields attached.
    pub async fn fetch_due(&self, now: DateTime<Utc>) -> Result<Vec<DueReminder>> {
        self.reminders.fetch_due(now, DUE_BATCH_SIZE).await
    }

    /// Guarded status transition. Re-reporting the current status is an
    /// idempotent no-op so dispatcher callback retries stay harmless.
    async fn transition(&self, reminder_id: Uuid, to: ReminderStatus) -> Result<()> {
        let current = self
            .reminders
            .find_by_id(reminder_id)
            .await?
            .ok_or(RemindrError::ReminderNotFound { reminder_id })?;

        if current.status == to {
            return Ok(());
        }

        if !current.status.can_transition_to(to) {
            return Err(RemindrError::InvalidStateTransition {
                from: current.status.to_string(),
                to: to.to_string(),
            });
        }

        let sent_at = if to == ReminderStatus::Sent {
            Some(Utc::now())
        } else {
            None
        };

        self.reminders
            .update_status(reminder_id, to, sent_at)
            .await?
            .ok_or(RemindrError::ReminderNotFound { reminder_id })?;

        Ok(())
    }
}
