//! Common test utilities for vikunja-relay integration tests
//!
//! This module provides:
//! - Payload builders for Vikunja task events
//! - Configuration builders pointed at a wiremock Discord
//! - Helpers for driving the router in-process

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::io::Write;
use tower::ServiceExt;
use vikunja_relay_api::{create_router, AppState, ServiceConfig};
use vikunja_relay_core::{BotToken, ChannelId, DeliveryMode};
use vikunja_relay_service::build_relay;
use wiremock::{matchers::method, matchers::path, Mock, MockServer, ResponseTemplate};

pub const BOT_TOKEN: &str = "integration-bot-token";
pub const DEFAULT_CHANNEL: &str = "1280543736199123068";

// ============================================================================
// Payloads
// ============================================================================

/// A `task.created` payload with the given identifier.
pub fn task_created(identifier: &str) -> Value {
    json!({
        "event_name": "task.created",
        "time": "2024-09-01T12:00:00Z",
        "data": {
            "task": {
                "title": "Fix login page",
                "description": "Users cannot log in with SSO",
                "due_date": "2024-09-10T17:00:00Z",
                "priority": 3,
                "identifier": identifier
            },
            "doer": {
                "name": "Alex Doe",
                "username": "alex"
            }
        }
    })
}

// ============================================================================
// Configuration
// ============================================================================

/// Webhook-mode configuration targeting `server`.
pub fn webhook_config(server: &MockServer) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.delivery.mode = DeliveryMode::Webhook;
    config.delivery.webhook_url = Some(format!("{}/api/webhooks/1/abc", server.uri()));
    config
}

/// Session-mode configuration whose Discord API base is `server`.
pub fn session_config(server: &MockServer) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.delivery.mode = DeliveryMode::Session;
    config.delivery.bot_token = Some(BotToken::new(BOT_TOKEN));
    config.delivery.default_channel_id = Some(ChannelId::new(DEFAULT_CHANNEL));
    config.delivery.api_base_url = server.uri();
    config
}

/// Write a routing table to a temporary JSON file.
pub fn routing_file(table: Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create routing file");
    file.write_all(table.to_string().as_bytes())
        .expect("write routing file");
    file
}

/// Answer `GET /users/@me` so a session can connect.
pub async fn mount_bot_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "42", "username": "vikunja-relay" })),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Router helpers
// ============================================================================

/// Build the full router the binary would serve for `config`.
pub async fn build_app(config: ServiceConfig) -> Router {
    let relay = build_relay(&config).await.expect("relay should build");
    create_router(AppState::new(config, relay))
}

/// POST `payload` to `/` and return the status and body text.
pub async fn post_event(app: Router, payload: &Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("valid request");

    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    (status, String::from_utf8_lossy(&body).into_owned())
}
