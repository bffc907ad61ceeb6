//! Natural-language reminder parsing
//!
//! Converts free text plus a timezone into a structured reminder intent by
//! delegating extraction to the Gemini API, constrained to a JSON response
//! schema. The service is purely functional: no persistence, all state is
//! passed in, and every failure degrades to a safe fallback intent instead
//! of an error.

use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::utils::errors::{ParserBackendError, RemindrError, Result};

/// Structured intent extracted from a free-text message. Transient, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReminderIntent {
    /// The task to remind about; echoes the original text on fallback
    pub message: String,
    /// YYYY-MM-DD, empty on fallback
    #[serde(default)]
    pub date: String,
    /// HH:MM 24-hour, empty on fallback
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: Option<String>,
    pub is_reminder: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap())
}

impl ParsedReminderIntent {
    /// Whether the extracted date and time are well-formed wire strings
    pub fn has_valid_datetime(&self) -> bool {
        date_pattern().is_match(&self.date) && time_pattern().is_match(&self.time)
    }

    /// Safe fallback when the backend fails or emits something unusable
    pub fn fallback(original_message: &str) -> Self {
        Self {
            message: original_message.to_string(),
            date: String::new(),
            time: String::new(),
            location: None,
            is_reminder: false,
            error_message: Some(
                "Failed to parse your message. Please try: 'remind me [when] to [task]'"
                    .to_string(),
            ),
        }
    }
}

/// Gemini generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Natural-language reminder parser backed by Gemini
#[derive(Debug, Clone)]
pub struct ReminderParser {
    client: Client,
    config: ParserConfig,
    default_timezone: Tz,
}

impl ReminderParser {
    /// Create a new ReminderParser instance
    pub fn new(config: ParserConfig, default_timezone: Tz) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Remindr/1.0")
            .build()
            .map_err(RemindrError::Http)?;

        Ok(Self {
            client,
            config,
            default_timezone,
        })
    }

    /// Parse a user message into a reminder intent, anchored at the current
    /// time in the caller's timezone.
    pub async fn parse(&self, user_message: &str, timezone: &str) -> ParsedReminderIntent {
        self.parse_with_anchor(user_message, timezone, Utc::now())
            .await
    }

    /// Parse with an explicit "now" anchor. Relative expressions in the
    /// prompt ("tomorrow", "in 2 hours") resolve against this instant in the
    /// caller's timezone.
    pub async fn parse_with_anchor(
        &self,
        user_message: &str,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> ParsedReminderIntent {
        let tz = self.resolve_timezone(timezone);
        let local = now.with_timezone(&tz);
        let current_date = local.format("%Y-%m-%d").to_string();
        let current_time = local.format("%H:%M").to_string();

        let prompt = build_prompt(user_message, &current_date, &current_time, tz.name());

        match self.generate(&prompt).await {
            Ok(intent) => {
                if intent.is_reminder && !intent.has_valid_datetime() {
                    warn!(
                        date = %intent.date,
                        time = %intent.time,
                        "Parser backend returned malformed date/time"
                    );
                    return ParsedReminderIntent::fallback(user_message);
                }
                intent
            }
            Err(e) => {
                warn!(error = %e, "Parser backend call failed, returning fallback");
                ParsedReminderIntent::fallback(user_message)
            }
        }
    }

    /// Language inference is delegated to the model; unknown timezone
    /// strings degrade to the configured default rather than erroring.
    fn resolve_timezone(&self, timezone: &str) -> Tz {
        match timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                debug!(timezone = timezone, "Unknown timezone, using default");
                self.default_timezone
            }
        }
    }

    /// Make the constrained generateContent call and decode the intent
    async fn generate(&self, prompt: &str) -> Result<ParsedReminderIntent> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_url, self.config.model, self.config.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: intent_schema(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemindrError::ServiceUnavailable(ParserBackendError::Timeout.to_string())
                } else if e.is_connect() {
                    RemindrError::ServiceUnavailable(
                        ParserBackendError::ServiceUnavailable.to_string(),
                    )
                } else {
                    RemindrError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemindrError::ServiceUnavailable(
                ParserBackendError::RequestFailed(format!("HTTP {}: {}", status, error_text))
                    .to_string(),
            ));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            RemindrError::ServiceUnavailable(
                ParserBackendError::InvalidResponse(e.to_string()).to_string(),
            )
        })?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| {
                RemindrError::ServiceUnavailable(
                    ParserBackendError::InvalidResponse("empty candidates".to_string())
                        .to_string(),
                )
            })?;

        let intent: ParsedReminderIntent = serde_json::from_str(text)?;
        Ok(intent)
    }
}

/// JSON schema constraining the model output to the intent shape
fn intent_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "message": {
                "type": "STRING",
                "description": "The actual reminder message/task to remind about"
            },
            "date": {
                "type": "STRING",
                "description": "Date in YYYY-MM-DD format"
            },
            "time": {
                "type": "STRING",
                "description": "Time in HH:MM format (24-hour)"
            },
            "location": {
                "type": "STRING",
                "description": "Location if mentioned, otherwise empty string",
                "nullable": true
            },
            "is_reminder": {
                "type": "BOOLEAN",
                "description": "Whether this message is a valid reminder request"
            },
            "error_message": {
                "type": "STRING",
                "description": "Error message if the request is invalid or unclear",
                "nullable": true
            }
        },
        "required": ["message", "date", "time", "is_reminder"]
    })
}

/// Build the extraction prompt. Carries the anchor date/time in the user's
/// timezone, the ambiguous-hour rule, and English/Hindi examples.
fn build_prompt(user_message: &str, current_date: &str, current_time: &str, timezone: &str) -> String {
    format!(
        r#"You are a smart reminder assistant. Parse the user's message to extract reminder details.

Current date: {current_date}
Current time: {current_time}
User timezone: {timezone}

User message: "{user_message}"

Instructions:
- Extract what the user wants to be reminded about (the task/message)
- Calculate the correct date and time based on relative terms like "tomorrow", "in 2 hours", "next Monday", "at 3pm", etc.
- If user says "tomorrow at 3pm", calculate tomorrow's date and use 15:00
- If user says "in 30 minutes", add 30 minutes to current time
- If user says "next week Monday", calculate that date
- Support both English and Hindi language inputs
- If the message is not a reminder request (e.g., "hello", "what can you do?"), set is_reminder to false
- If time is ambiguous (e.g., "3" without am/pm), assume PM for times 1-6, AM for times 7-12
- Extract location if mentioned (e.g., "remind me to buy groceries at the supermarket")

Examples:
- "remind me tomorrow at 3pm to call mom" -> message: "call mom", date: [tomorrow's date], time: "15:00"
- "याद दिलाओ कल सुबह 9 बजे दवाई लेनी है" -> message: "दवाई लेनी है", date: [tomorrow's date], time: "09:00"
- "set reminder for meeting in 2 hours" -> message: "meeting", date: [today], time: [current + 2 hours]
- "hello" -> is_reminder: false, error_message: "This doesn't look like a reminder request""#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_anchor_and_hour_rule() {
        let prompt = build_prompt("remind me at 3 to call mom", "2024-01-01", "10:30", "Asia/Kolkata");
        assert!(prompt.contains("Current date: 2024-01-01"));
        assert!(prompt.contains("Current time: 10:30"));
        assert!(prompt.contains("User timezone: Asia/Kolkata"));
        // Ambiguous-hour disambiguation is fixed by contract
        assert!(prompt.contains("assume PM for times 1-6, AM for times 7-12"));
        // Hindi support is prompted, not parameterised
        assert!(prompt.contains("याद दिलाओ"));
    }

    #[test]
    fn test_intent_decoding_snake_case_wire_names() {
        let json = r#"{
            "message": "call mom",
            "date": "2024-01-02",
            "time": "15:00",
            "location": null,
            "is_reminder": true,
            "error_message": null
        }"#;
        let intent: ParsedReminderIntent = serde_json::from_str(json).unwrap();
        assert!(intent.is_reminder);
        assert_eq!(intent.message, "call mom");
        assert!(intent.has_valid_datetime());
    }

    #[test]
    fn test_non_reminder_decodes_without_date() {
        let json = r#"{
            "message": "hello",
            "date": "",
            "time": "",
            "is_reminder": false,
            "error_message": "This doesn't look like a reminder request"
        }"#;
        let intent: ParsedReminderIntent = serde_json::from_str(json).unwrap();
        assert!(!intent.is_reminder);
        assert!(intent.error_message.is_some());
    }

    #[test]
    fn test_datetime_validation() {
        let mut intent = ParsedReminderIntent::fallback("x");
        intent.date = "2024-01-02".to_string();
        intent.time = "15:00".to_string();
        assert!(intent.has_valid_datetime());

        intent.time = "3pm".to_string();
        assert!(!intent.has_valid_datetime());

        intent.time = "25:00".to_string();
        assert!(!intent.has_valid_datetime());

        intent.time = "15:00".to_string();
        intent.date = "tomorrow".to_string();
        assert!(!intent.has_valid_datetime());
    }

    #[test]
    fn test_fallback_echoes_original_text() {
        let intent = ParsedReminderIntent::fallback("remind me soonish");
        assert!(!intent.is_reminder);
        assert_eq!(intent.message, "remind me soonish");
        assert!(intent.date.is_empty());
        assert!(intent.time.is_empty());
        assert!(intent.error_message.unwrap().contains("remind me [when] to [task]"));
    }

    #[test]
    fn test_schema_requires_core_fields() {
        let schema = intent_schema();
        let required = schema["required"].as_array().unwrap();
        for field in ["message", "date", "time", "is_reminder"] {
            assert!(required.iter().any(|v| v == field));
        }
    }
}
