//! Tests for [`WebhookNotifier`] against a mock Discord endpoint.

use super::*;
use crate::delivery::{ChannelId, DEFAULT_TIMEOUT};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOK_PATH: &str = "/api/webhooks/1280/secret-token";

fn webhook_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), WEBHOOK_PATH)
}

mod construction {
    use super::*;

    #[test]
    fn test_rejects_unparseable_url() {
        let result = WebhookNotifier::new("not a url", DEFAULT_TIMEOUT);
        assert!(matches!(
            result,
            Err(DeliveryError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = WebhookNotifier::new("ftp://example.com/hook", DEFAULT_TIMEOUT);
        assert!(matches!(
            result,
            Err(DeliveryError::InvalidConfiguration { .. })
        ));
    }

    /// The webhook token lives in the URL path and must never be shown.
    #[test]
    fn test_destination_and_debug_hide_token() {
        let notifier = WebhookNotifier::new(
            "https://discord.com/api/webhooks/1280/secret-token",
            DEFAULT_TIMEOUT,
        )
        .unwrap();

        assert_eq!(notifier.destination(), "webhook discord.com");
        assert!(!format!("{:?}", notifier).contains("secret-token"));
        assert_eq!(notifier.mode(), DeliveryMode::Webhook);
    }
}

mod delivery {
    use super::*;

    #[tokio::test]
    async fn test_posts_content_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .and(query_param("wait", "true"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "content": "hello" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&webhook_url(&server), DEFAULT_TIMEOUT).unwrap();
        let receipt = notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap();

        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.destination, "webhook 127.0.0.1");
    }

    /// Discord only answers 200 when it waits for the message; an empty 204 is a failure.
    #[tokio::test]
    async fn test_no_content_response_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}?wait=false", webhook_url(&server));
        let notifier = WebhookNotifier::new(&url, DEFAULT_TIMEOUT).unwrap();
        let err = notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Rejected { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_configured_wait_is_replaced_and_other_params_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .and(query_param("wait", "true"))
            .and(query_param("thread_id", "99"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}?wait=false&thread_id=99", webhook_url(&server));
        let notifier = WebhookNotifier::new(&url, DEFAULT_TIMEOUT).unwrap();
        notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let waits: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(key, _)| key == "wait")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(waits, vec!["true".to_string()]);
    }

    /// A routed channel cannot redirect a webhook; the message still goes to the URL.
    #[tokio::test]
    async fn test_routed_channel_still_uses_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&webhook_url(&server), DEFAULT_TIMEOUT).unwrap();
        let message = OutboundMessage::new(Destination::Channel(ChannelId::new("C1")), "hi");

        assert!(notifier.deliver(&message).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&webhook_url(&server), DEFAULT_TIMEOUT).unwrap();
        let err = notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap_err();

        match err {
            DeliveryError::Rejected { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Unknown Webhook");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(&webhook_url(&server), Duration::from_millis(100)).unwrap();
        let err = notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, DeliveryError::Timeout { .. }),
            "expected Timeout, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let server = MockServer::start().await;
        let url = webhook_url(&server);
        drop(server);

        let notifier = WebhookNotifier::new(&url, DEFAULT_TIMEOUT).unwrap();
        let err = notifier
            .deliver(&OutboundMessage::new(Destination::Default, "hello"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, DeliveryError::Transport { .. }),
            "expected Transport, got {err:?}"
        );
    }
}
