//! Dashboard reminder CRUD
//!
//! Bearer-authenticated surface for the web dashboard: list own reminders,
//! create with quota feedback, delete own reminder by id.

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reminder::{CreateReminderRequest, Platform, Reminder};
use crate::services::Session;
use crate::utils::errors::Result;

use super::AppState;

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.services.auth_service.verify_bearer(authorization)
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub reminders: Vec<Reminder>,
}

/// GET /api/reminders — all of the caller's reminders, newest first
pub async fn list_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListResponse>> {
    let session = authenticate(&state, &headers)?;
    let reminders = state
        .services
        .reminder_service
        .list_all(session.user_id)
        .await?;

    Ok(Json(ListResponse { reminders }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub message: String,
    pub reminder_time: DateTime<Utc>,
    pub platform: Platform,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub reminder: Reminder,
    pub remaining: i64,
    pub limit: i64,
}

/// POST /api/reminders — quota-gated create.
///
/// A quota denial propagates as `QuotaExceeded` and surfaces as 429 with
/// limit/used/resetAt on this path.
pub async fn create_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateRequest>,
) -> Result<Json<CreateResponse>> {
    let session = authenticate(&state, &headers)?;

    let create = CreateReminderRequest {
        user_id: session.user_id,
        message: request.message,
        reminder_time: request.reminder_time,
        platform: request.platform,
        location: request.location,
    };

    let (reminder, quota) = state.services.reminder_service.create(create).await?;

    Ok(Json(CreateResponse {
        reminder,
        remaining: quota.remaining,
        limit: quota.limit,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// DELETE /api/reminders/:id — owner-scoped hard delete.
///
/// Deleting a reminder owned by someone else reports the same success as
/// deleting nothing, so ids cannot be probed.
pub async fn delete_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let session = authenticate(&state, &headers)?;

    state
        .services
        .reminder_service
        .delete(id, session.user_id)
        .await?;

    Ok(Json(DeleteResponse { success: true }))
}
