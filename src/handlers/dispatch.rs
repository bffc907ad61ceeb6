//! Dispatcher webhook
//!
//! The external delivery worker polls GET for due reminders and reports the
//! delivery outcome back via POST.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::reminder::{DueReminder, ReminderStatus};
use crate::utils::errors::Result;
use crate::utils::logging::log_dispatch_update;

use super::AppState;

/// Due-reminders poll response
#[derive(Debug, Serialize)]
pub struct DueRemindersResponse {
    pub success: bool,
    pub reminders: Vec<DueReminder>,
    pub count: usize,
    pub checked_at: DateTime<Utc>,
    pub action: &'static str,
}

/// GET /api/webhook/reminder — up to 50 due reminders with contact fields
pub async fn due_reminders(State(state): State<AppState>) -> Result<Json<DueRemindersResponse>> {
    let now = Utc::now();
    let reminders = state.services.reminder_service.fetch_due(now).await?;

    info!(count = reminders.len(), "Due reminders fetched for dispatch");

    let count = reminders.len();
    Ok(Json(DueRemindersResponse {
        success: true,
        reminders,
        count,
        checked_at: now,
        action: "due_reminders_fetched",
    }))
}

fn default_status() -> ReminderStatus {
    ReminderStatus::Sent
}

/// Dispatcher push-back after a delivery attempt
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub reminder_id: Uuid,
    #[serde(default = "default_status")]
    pub status: ReminderStatus,
}

/// Push-back response: the updated reminder with contact fields attached
#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub message: String,
    pub reminder: DueReminder,
    pub action: &'static str,
}

/// POST /api/webhook/reminder — flip a reminder's status after delivery
pub async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>> {
    let reminder = state
        .services
        .reminder_service
        .mark_status(request.reminder_id, request.status)
        .await?;

    log_dispatch_update(request.reminder_id, &request.status.to_string());

    Ok(Json(StatusUpdateResponse {
        success: true,
        message: format!("Reminder status updated to {}", request.status),
        reminder,
        action: "status_updated",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_sent() {
        let req: StatusUpdateRequest = serde_json::from_str(
            r#"{"reminder_id": "6f2a1f64-9f2e-4f7a-8a3e-111111111111"}"#,
        )
        .unwrap();
        assert_eq!(req.status, ReminderStatus::Sent);
    }

    #[test]
    fn test_explicit_failed_status() {
        let req: StatusUpdateRequest = serde_json::from_str(
            r#"{"reminder_id": "6f2a1f64-9f2e-4f7a-8a3e-111111111111", "status": "failed"}"#,
        )
        .unwrap();
        assert_eq!(req.status, ReminderStatus::Failed);
    }
}
