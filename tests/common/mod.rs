//! Common test utilities for integration tests
//!
//! Provides wire-format fixtures and helpers shared across the integration
//! test files.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use clearkeeper::domain::models::RawActivityRecord;
use clearkeeper::infrastructure::bungie::{BungieClient, BungieClientConfig};
use serde_json::{json, Value};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Bungie client pointed at a mock server with a short retry delay.
pub fn bungie_client(base_url: &str, max_attempts: u32) -> BungieClient {
    BungieClient::new(BungieClientConfig {
        api_key: "test-api-key".to_string(),
        base_url: format!("{base_url}/Platform"),
        timeout_secs: 5,
        max_attempts,
        retry_delay_ms: 10,
    })
    .expect("client builds")
}

/// Successful platform envelope around `response`.
pub fn envelope(response: Value) -> Value {
    json!({
        "Response": response,
        "ErrorCode": 1,
        "ErrorStatus": "Success",
        "Message": "Ok",
        "ThrottleSeconds": 0,
        "MessageData": {}
    })
}

/// Failed platform envelope with a service-level error code.
pub fn error_envelope(code: i32, status: &str) -> Value {
    json!({
        "ErrorCode": code,
        "ErrorStatus": status,
        "Message": "An error occurred",
        "ThrottleSeconds": 0,
        "MessageData": {}
    })
}

fn stat(value: f64) -> Value {
    json!({ "statId": "stat", "basic": { "value": value, "displayValue": value.to_string() } })
}

/// One activity-history entry as the platform returns it.
pub fn activity_json(instance_id: &str, hash: u32, completed: bool, players: u32, deaths: u32) -> Value {
    json!({
        "period": "2024-03-01T18:00:00Z",
        "activityDetails": {
            "referenceId": hash,
            "directorActivityHash": hash,
            "instanceId": instance_id,
            "mode": 82,
            "modes": [82, 7],
            "isPrivate": false,
            "membershipType": 2
        },
        "values": {
            "completed": stat(if completed { 1.0 } else { 0.0 }),
            "playerCount": stat(f64::from(players)),
            "deaths": stat(f64::from(deaths)),
            "opponentsDefeated": stat(42.0),
            "timePlayedSeconds": stat(1800.0)
        }
    })
}

/// Domain record with the fields the classifier reads.
pub fn record(instance_id: &str, hash: u32, completed: bool, players: u32, deaths: u32) -> RawActivityRecord {
    RawActivityRecord {
        instance_id: instance_id.to_string(),
        director_activity_hash: hash,
        period: "2024-03-01T18:00:00Z"
            .parse::<DateTime<Utc>>()
            .expect("valid timestamp"),
        completed,
        player_count: players,
        deaths,
        opponents_defeated: 42,
        time_played_seconds: 1800,
    }
}
