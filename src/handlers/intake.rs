//! Message-intake webhook
//!
//! Single endpoint the chat-bot layers post inbound messages to. The
//! `action` field selects the operation; every response variant carries an
//! `action` echo tag the bot layer branches on to phrase its reply.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::reminder::{CreateReminderRequest, Platform, Reminder, ReminderStatus};
use crate::models::user::User;
use crate::services::identity::{ConnectOutcome, PlatformIdentity};
use crate::utils::errors::{RemindrError, Result};
use crate::utils::helpers::truncate_text;

use super::AppState;

const PHRASING_HINT: &str = "Say something like: 'remind me tomorrow at 3pm to call mom' \
    or 'याद दिलाओ कल 9 बजे meeting है'";

/// Operation selector for the intake endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeAction {
    Connect,
    #[default]
    CreateReminder,
    ListReminders,
    CancelReminder,
}

fn default_true() -> bool {
    true
}

/// Inbound message event from a chat-bot collaborator
#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub platform: Option<Platform>,
    pub sender_id: Option<String>,
    pub chat_id: Option<String>,
    pub phone: Option<String>,
    pub message_text: Option<String>,
    pub title: Option<String>,
    /// Together with `time`, bypasses the parser
    pub date: Option<String>,
    pub time: Option<String>,
    pub user_id: Option<Uuid>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub action: IntakeAction,
    #[serde(default = "default_true")]
    pub use_ai_parsing: bool,
    pub reminder_id: Option<Uuid>,
}

/// Trimmed reminder shape returned to the bot layer
#[derive(Debug, Serialize)]
pub struct ReminderView {
    pub id: Uuid,
    pub message: String,
    pub reminder_time: DateTime<Utc>,
    pub platform: Platform,
    pub status: ReminderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Reminder> for ReminderView {
    fn from(r: Reminder) -> Self {
        Self {
            id: r.id,
            message: r.message,
            reminder_time: r.reminder_time,
            platform: r.platform,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

/// Structured intake outcome; the tag is the `action` echo field
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IntakeResponse {
    Connected {
        success: bool,
        message: String,
        user_id: Uuid,
    },
    AlreadyConnected {
        success: bool,
        message: String,
        user_id: Uuid,
    },
    SignupRequired {
        success: bool,
        message: String,
    },
    ReminderCreated {
        success: bool,
        message: String,
        reminder: ReminderView,
        remaining: i64,
        limit: i64,
    },
    NotAReminder {
        success: bool,
        error: String,
        hint: String,
    },
    MissingData {
        success: bool,
        error: String,
    },
    InvalidDatetime {
        success: bool,
        error: String,
    },
    LimitReached {
        success: bool,
        error: String,
        limit: i64,
        used: i64,
        reset_at: DateTime<Utc>,
    },
    RemindersListed {
        success: bool,
        reminders: Vec<ReminderView>,
        count: usize,
    },
    ReminderCancelled {
        success: bool,
        message: String,
        reminder: ReminderView,
    },
}

impl IntakeResponse {
    fn status_code(&self) -> StatusCode {
        match self {
            IntakeResponse::Connected { .. }
            | IntakeResponse::AlreadyConnected { .. }
            | IntakeResponse::ReminderCreated { .. }
            | IntakeResponse::RemindersListed { .. }
            | IntakeResponse::ReminderCancelled { .. } => StatusCode::OK,
            IntakeResponse::SignupRequired { .. }
            | IntakeResponse::NotAReminder { .. }
            | IntakeResponse::MissingData { .. }
            | IntakeResponse::InvalidDatetime { .. } => StatusCode::BAD_REQUEST,
            IntakeResponse::LimitReached { .. } => StatusCode::FORBIDDEN,
        }
    }
}

/// POST /api/webhook/message
pub async fn message_webhook(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> Result<(StatusCode, Json<IntakeResponse>)> {
    let response = match request.action {
        IntakeAction::Connect => handle_connect(&state, &request).await?,
        IntakeAction::CreateReminder => handle_create(&state, &request).await?,
        IntakeAction::ListReminders => handle_list(&state, &request).await?,
        IntakeAction::CancelReminder => handle_cancel(&state, &request).await?,
    };

    Ok((response.status_code(), Json(response)))
}

/// Extract the platform identity from a request, if it carries one
fn identity_of(request: &IntakeRequest) -> Option<PlatformIdentity> {
    let platform = request.platform?;
    let raw = match platform {
        Platform::Telegram => request.chat_id.as_deref().or(request.sender_id.as_deref()),
        Platform::Whatsapp => request.phone.as_deref().or(request.sender_id.as_deref()),
    }?;

    if raw.is_empty() {
        return None;
    }
    Some(PlatformIdentity::new(platform, raw))
}

/// Resolve the acting user: platform identity first, explicit user id as the
/// dashboard-originated fallback.
async fn resolve_user(state: &AppState, request: &IntakeRequest) -> Result<User> {
    if let Some(identity) = identity_of(request) {
        return state.services.identity_service.resolve_required(&identity).await;
    }

    if let Some(user_id) = request.user_id {
        return state.services.identity_service.find_user(user_id).await;
    }

    Err(RemindrError::InvalidInput(
        "User identifier required (chat_id, phone, or user_id)".to_string(),
    ))
}

async fn handle_connect(state: &AppState, request: &IntakeRequest) -> Result<IntakeResponse> {
    let identity = identity_of(request).ok_or_else(|| {
        RemindrError::InvalidInput("Invalid connection request".to_string())
    })?;

    let platform = identity.platform();
    let outcome = state
        .services
        .identity_service
        .connect(&identity, request.user_id)
        .await?;

    Ok(match outcome {
        ConnectOutcome::Connected(user) => IntakeResponse::Connected {
            success: true,
            message: match platform {
                Platform::Telegram => "Connected to Telegram!".to_string(),
                Platform::Whatsapp => "Connected to WhatsApp!".to_string(),
            },
            user_id: user.id,
        },
        ConnectOutcome::AlreadyConnected { user_id } => IntakeResponse::AlreadyConnected {
            success: true,
            message: "Already connected!".to_string(),
            user_id,
        },
        ConnectOutcome::SignupRequired => IntakeResponse::SignupRequired {
            success: false,
            message: "Please sign up first at our website".to_string(),
        },
    })
}

async fn handle_create(state: &AppState, request: &IntakeRequest) -> Result<IntakeResponse> {
    let user = resolve_user(state, request).await?;

    // Each inbound bot message spends one unit of the daily API quota.
    // Quota denials are checked before parsing so over-quota traffic never
    // costs a model call.
    match state.services.quota_service.enforce_api_limit(user.id).await {
        Ok(_) => state.services.quota_service.increment_api_count(user.id).await?,
        Err(e) => return limit_reached(e),
    }

    let reminder_quota = state.services.quota_service.check_reminder_limit(user.id).await?;
    if !reminder_quota.allowed {
        return limit_reached(RemindrError::QuotaExceeded {
            limit: reminder_quota.limit,
            used: reminder_quota.used,
            reset_at: reminder_quota.reset_at,
        });
    }

    let mut message = request
        .message_text
        .clone()
        .or_else(|| request.title.clone())
        .unwrap_or_default();
    let mut location = request.location.clone();
    let timezone = request
        .timezone
        .as_deref()
        .unwrap_or(state.services.default_timezone.name());

    let needs_parsing =
        request.use_ai_parsing && !message.is_empty() && (request.date.is_none() || request.time.is_none());

    let reminder_time = if needs_parsing {
        debug!(
            user_id = %user.id,
            text = %truncate_text(&message, 80),
            timezone = timezone,
            "Parsing inbound message"
        );
        let parsed = state.services.parser_service.parse(&message, timezone).await;

        if !parsed.is_reminder {
            return Ok(IntakeResponse::NotAReminder {
                success: false,
                error: parsed.error_message.unwrap_or_else(|| {
                    "This doesn't look like a reminder request. Try: 'remind me tomorrow at 3pm to call mom'"
                        .to_string()
                }),
                hint: PHRASING_HINT.to_string(),
            });
        }

        message = parsed.message.clone();
        if parsed.location.as_deref().is_some_and(|l| !l.is_empty()) {
            location = parsed.location.clone();
        }

        local_to_utc(&parsed.date, &parsed.time, timezone, state.services.default_timezone)
    } else {
        match (request.date.as_deref(), request.time.as_deref()) {
            (Some(date), Some(time)) => {
                local_to_utc(date, time, timezone, state.services.default_timezone)
            }
            _ => None,
        }
    };

    if message.is_empty() {
        return Ok(IntakeResponse::MissingData {
            success: false,
            error: "Missing message or title".to_string(),
        });
    }

    let Some(reminder_time) = reminder_time else {
        return Ok(IntakeResponse::InvalidDatetime {
            success: false,
            error: "Could not parse date/time. Please try: 'remind me tomorrow at 3pm to call mom'"
                .to_string(),
        });
    };

    let platform = request.platform.unwrap_or(Platform::Telegram);
    let create = CreateReminderRequest {
        user_id: user.id,
        message,
        reminder_time,
        platform,
        location,
    };

    match state.services.reminder_service.create(create).await {
        Ok((reminder, quota)) => Ok(IntakeResponse::ReminderCreated {
            success: true,
            message: format!(
                "Reminder set for {}",
                reminder.reminder_time.format("%Y-%m-%d %H:%M UTC")
            ),
            reminder: reminder.into(),
            remaining: quota.remaining,
            limit: quota.limit,
        }),
        Err(e @ RemindrError::QuotaExceeded { .. }) => limit_reached(e),
        Err(e) => Err(e),
    }
}

async fn handle_list(state: &AppState, request: &IntakeRequest) -> Result<IntakeResponse> {
    let user = resolve_user(state, request).await?;
    let reminders = state.services.reminder_service.list_pending(user.id).await?;

    debug!(user_id = %user.id, count = reminders.len(), "Pending reminders listed");

    let views: Vec<ReminderView> = reminders.into_iter().map(ReminderView::from).collect();
    let count = views.len();

    Ok(IntakeResponse::RemindersListed {
        success: true,
        reminders: views,
        count,
    })
}

async fn handle_cancel(state: &AppState, request: &IntakeRequest) -> Result<IntakeResponse> {
    let reminder_id = request
        .reminder_id
        .ok_or_else(|| RemindrError::InvalidInput("reminder_id required".to_string()))?;

    let reminder = state.services.reminder_service.cancel(reminder_id).await?;

    Ok(IntakeResponse::ReminderCancelled {
        success: true,
        message: "Reminder cancelled".to_string(),
        reminder: reminder.into(),
    })
}

/// Map a quota denial to the `limit_reached` outcome (403 on this surface)
fn limit_reached(error: RemindrError) -> Result<IntakeResponse> {
    match error {
        RemindrError::QuotaExceeded {
            limit,
            used,
            reset_at,
        } => Ok(IntakeResponse::LimitReached {
            success: false,
            error: format!(
                "You've reached your limit of {} ({} used). Upgrade to Pro for unlimited reminders!",
                limit, used
            ),
            limit,
            used,
            reset_at,
        }),
        other => Err(other),
    }
}

/// Interpret a YYYY-MM-DD date and HH:MM time in the given timezone and
/// normalize to UTC. Ambiguous or non-existent local times (DST edges)
/// resolve to the earliest valid instant.
fn local_to_utc(
    date: &str,
    time: &str,
    timezone: &str,
    default_tz: Tz,
) -> Option<DateTime<Utc>> {
    let tz = timezone.parse::<Tz>().unwrap_or(default_tz);
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let local = tz.from_local_datetime(&date.and_time(time)).earliest()?;
    Some(local.with_timezone(&Utc))
}

/// GET /api/webhook/message — self-describing contract document
pub async fn describe() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Message webhook is running with AI-powered natural language parsing",
        "supported_actions": ["connect", "create_reminder", "list_reminders", "cancel_reminder"],
        "expected_fields": {
            "connect": ["platform", "chat_id/phone", "user_id (optional)"],
            "create_reminder": {
                "required": ["platform", "chat_id/phone/user_id", "message_text"],
                "optional": ["date", "time", "timezone", "use_ai_parsing"],
                "note": "If date/time not provided, AI will parse from message_text (e.g., 'remind me tomorrow at 3pm to call mom')"
            },
            "list_reminders": ["platform", "chat_id/phone/user_id"],
            "cancel_reminder": ["reminder_id"]
        },
        "ai_parsing": {
            "enabled": true,
            "supported_languages": ["English", "Hindi"],
            "examples": [
                "remind me tomorrow at 3pm to call mom",
                "याद दिलाओ कल सुबह 9 बजे दवाई लेनी है",
                "set reminder for meeting in 2 hours",
                "remind me next Monday at 10am to submit report"
            ]
        }
    }))
}
