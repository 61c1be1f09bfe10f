//! Tests for startup wiring.

use super::*;
use serde_json::json;
use std::io::Write;
use vikunja_relay_core::{BotToken, ChannelId};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn webhook_config(url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.delivery.mode = DeliveryMode::Webhook;
    config.delivery.webhook_url = Some(url.to_string());
    config
}

fn session_config(api_base: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.delivery.mode = DeliveryMode::Session;
    config.delivery.bot_token = Some(BotToken::new("test-bot-token"));
    config.delivery.default_channel_id = Some(ChannelId::new("1280543736199123068"));
    config.delivery.api_base_url = api_base.to_string();
    config
}

fn routing_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

async fn mount_identity(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bot test-bot-token"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "id": "42", "username": "relay" })),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_exit_codes_distinguish_failure_classes() {
    let config_error = StartupError::from(ConfigError::Invalid {
        message: "bad".to_string(),
    });
    let routing_error = StartupError::from(RoutingError::FileNotFound {
        path: "routes.json".to_string(),
    });
    let delivery_error = StartupError::from(DeliveryError::Authentication { status: 401 });
    let server_error = StartupError::from(ServiceError::ServerFailed {
        message: "boom".to_string(),
    });

    assert_eq!(config_error.exit_code(), 2);
    assert_eq!(routing_error.exit_code(), 3);
    assert_eq!(delivery_error.exit_code(), 4);
    assert_eq!(server_error.exit_code(), 1);
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_routing_disabled_yields_no_table() {
    let config = webhook_config("https://example.com/hook");

    assert!(load_routing(&config).unwrap().is_none());
}

#[test]
fn test_routing_table_is_loaded_from_file() {
    let file = routing_file(
        r#"{ "ENG": { "channel_id": "C1", "role_id": "R1" }, "OPS": { "channel_id": "C2" } }"#,
    );
    let mut config = webhook_config("https://example.com/hook");
    config.routing.enabled = true;
    config.routing.file = Some(file.path().to_path_buf());

    let table = load_routing(&config).unwrap().unwrap();

    assert_eq!(table.len(), 2);
}

#[test]
fn test_missing_routing_file_fails_with_routing_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = webhook_config("https://example.com/hook");
    config.routing.enabled = true;
    config.routing.file = Some(dir.path().join("absent.json"));

    let err = load_routing(&config).unwrap_err();

    assert!(matches!(err, StartupError::Routing(_)));
    assert_eq!(err.exit_code(), 3);
}

// ============================================================================
// Relay construction
// ============================================================================

#[tokio::test]
async fn test_webhook_relay_is_built_without_network() {
    let config = webhook_config("https://discord.example/api/webhooks/1/abc");

    let relay = build_relay(&config).await.unwrap();

    assert_eq!(relay.delivery_mode(), DeliveryMode::Webhook);
    assert!(!relay.routing_enabled());
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected_before_connecting() {
    let mut config = ServiceConfig::default();
    config.delivery.mode = DeliveryMode::Session;

    let err = build_relay(&config).await.unwrap_err();

    assert!(matches!(err, StartupError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_session_relay_connects_and_posts_startup_message() {
    let server = MockServer::start().await;
    mount_identity(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/channels/1280543736199123068/messages"))
        .and(body_json(json!({ "content": "Pong!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = session_config(&server.uri());
    config.delivery.startup_message = Some("Pong!".to_string());

    let relay = build_relay(&config).await.unwrap();

    assert_eq!(relay.delivery_mode(), DeliveryMode::Session);
}

#[tokio::test]
async fn test_startup_message_failure_is_not_fatal() {
    let server = MockServer::start().await;
    mount_identity(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/channels/1280543736199123068/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = session_config(&server.uri());
    config.delivery.startup_message = Some("Pong!".to_string());

    assert!(build_relay(&config).await.is_ok());
}

#[tokio::test]
async fn test_rejected_token_fails_with_delivery_exit_code() {
    let server = MockServer::start().await;
    mount_identity(&server, 401).await;

    let err = build_relay(&session_config(&server.uri())).await.unwrap_err();

    assert!(matches!(
        err,
        StartupError::Delivery(DeliveryError::Authentication { status: 401 })
    ));
    assert_eq!(err.exit_code(), 4);
}
