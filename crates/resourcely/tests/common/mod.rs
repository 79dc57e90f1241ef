//! Common test utilities and helpers

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use resourcely::{Client, ExponentialBackoff, RetryPolicy};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::MockServer;

/// Token whose payload names the `acme` tenant.
#[allow(dead_code)]
pub fn test_token() -> String {
    token_for(&json!({"@resourcely/tenant": "acme", "sub": "user-1"}))
}

/// Unsigned JWT carrying `claims`.
#[allow(dead_code)]
pub fn token_for(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Retries with millisecond delays so tests stay fast.
#[allow(dead_code)]
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(
        ExponentialBackoff::builder()
            .max_retries(max_retries)
            .initial_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(5))
            .jitter(0.0)
            .build(),
    )
}

/// Client pointed at the mock server.
#[allow(dead_code)]
pub fn client(server: &MockServer) -> Client {
    Client::builder()
        .host(server.uri())
        .auth_token(test_token())
        .retry(fast_retry(2))
        .build()
        .expect("Failed to build client")
}

/// A blueprint record as the API returns it.
#[allow(dead_code)]
pub fn blueprint_json(series_id: &str, version: i64, name: &str, is_published: bool) -> Value {
    json!({
        "id": format!("{series_id}-v{version}"),
        "series_id": series_id,
        "version": version,
        "scope": "TENANT",
        "name": name,
        "description": "",
        "content": "resource \"aws_s3_bucket\" {}",
        "categories": ["BLUEPRINTS_FILTER_DATA_STORAGE"],
        "guidance": "",
        "labels": [{"label": "team-a"}],
        "excluded_context_question_series": [],
        "provider": "PROVIDER_AMAZON",
        "is_published": is_published
    })
}

/// A global value record as the API returns it.
#[allow(dead_code)]
pub fn global_value_json(series_id: &str, key: &str) -> Value {
    json!({
        "id": format!("{series_id}-v1"),
        "series_id": series_id,
        "version": 1,
        "key": key,
        "type": "PRESET_VALUE_TEXT",
        "name": key,
        "options": [{"key": "east", "label": "East", "value": "us-east-1"}],
        "is_deprecated": false
    })
}
