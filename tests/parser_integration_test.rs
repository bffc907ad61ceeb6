//! Parser integration tests against a mocked Gemini backend.

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remindr::config::ParserConfig;
use remindr::services::ReminderParser;

const MODEL: &str = "gemini-1.5-flash";

fn parser_for(server: &MockServer) -> ReminderParser {
    let config = ParserConfig {
        api_url: server.uri(),
        api_key: "test-key".to_string(),
        model: MODEL.to_string(),
        timeout_seconds: 5,
    };
    ReminderParser::new(config, Tz::Asia__Kolkata).unwrap()
}

fn generate_content_path() -> String {
    format!("/v1beta/models/{}:generateContent", MODEL)
}

/// Wrap an intent payload the way Gemini returns it: JSON text inside the
/// first candidate part.
fn gemini_response(intent_json: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": intent_json } ] } }
        ]
    })
}

#[tokio::test]
async fn round_trip_with_fixed_anchor() {
    let server = MockServer::start().await;

    // The prompt must anchor relative expressions at the caller's local
    // date, not the server's.
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(body_string_contains("Current date: 2024-01-01"))
        .and(body_string_contains("call mom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            r#"{"message":"call mom","date":"2024-01-02","time":"15:00","location":null,"is_reminder":true,"error_message":null}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    // 2024-01-01 10:00 IST
    let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 4, 30, 0).unwrap();

    let intent = parser
        .parse_with_anchor("remind me tomorrow at 3pm to call mom", "Asia/Kolkata", anchor)
        .await;

    assert!(intent.is_reminder);
    assert_eq!(intent.date, "2024-01-02");
    assert_eq!(intent.time, "15:00");
    assert!(intent.message.contains("call mom"));
}

#[tokio::test]
async fn ambiguous_hours_resolve_per_contract() {
    let server = MockServer::start().await;

    // 1-6 without am/pm is PM, 7-12 is AM; the model is instructed
    // accordingly and its constrained output flows through unchanged.
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(body_string_contains("remind me at 3 to call mom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            r#"{"message":"call mom","date":"2024-01-01","time":"15:00","is_reminder":true}"#,
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(body_string_contains("remind me at 9 to call mom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            r#"{"message":"call mom","date":"2024-01-01","time":"09:00","is_reminder":true}"#,
        )))
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 4, 30, 0).unwrap();

    let pm = parser
        .parse_with_anchor("remind me at 3 to call mom", "Asia/Kolkata", anchor)
        .await;
    assert_eq!(pm.time, "15:00");

    let am = parser
        .parse_with_anchor("remind me at 9 to call mom", "Asia/Kolkata", anchor)
        .await;
    assert_eq!(am.time, "09:00");
}

#[tokio::test]
async fn non_reminder_input_gets_guidance() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            r#"{"message":"hello","date":"","time":"","is_reminder":false,"error_message":"This doesn't look like a reminder request"}"#,
        )))
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    let intent = parser.parse("hello", "Asia/Kolkata").await;

    assert!(!intent.is_reminder);
    assert!(!intent.error_message.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn backend_failure_degrades_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    let intent = parser.parse("remind me tomorrow to water plants", "Asia/Kolkata").await;

    // Never an error: original text echoed, empty date/time, retry hint
    assert!(!intent.is_reminder);
    assert_eq!(intent.message, "remind me tomorrow to water plants");
    assert!(intent.date.is_empty());
    assert!(intent.time.is_empty());
    assert!(intent.error_message.is_some());
}

#[tokio::test]
async fn unparseable_candidate_degrades_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_response("this is not json")),
        )
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    let intent = parser.parse("remind me tomorrow to water plants", "Asia/Kolkata").await;

    assert!(!intent.is_reminder);
    assert_eq!(intent.message, "remind me tomorrow to water plants");
}

#[tokio::test]
async fn malformed_model_datetime_degrades_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            r#"{"message":"call mom","date":"tomorrow","time":"3pm","is_reminder":true}"#,
        )))
        .mount(&server)
        .await;

    let parser = parser_for(&server);
    let intent = parser.parse("remind me tomorrow at 3 to call mom", "Asia/Kolkata").await;

    assert!(!intent.is_reminder);
    assert_eq!(intent.message, "remind me tomorrow at 3 to call mom");
}
