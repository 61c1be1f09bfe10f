//! Fixed outbound Discord webhook delivery.

use super::{
    build_client, DeliveryError, DeliveryMode, DeliveryReceipt, Destination, MessagePayload,
    Notifier, OutboundMessage,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// Posts every message to one configured webhook URL
///
/// Discord webhook URLs embed their secret token in the path, so the URL is
/// never logged; [`WebhookNotifier::destination`] shows only the host.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
    destination: String,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Create a notifier for the given webhook URL.
    ///
    /// `wait=true` is forced, replacing any configured `wait` value, so
    /// Discord answers with `200 OK` once the message is stored. Any other
    /// status is a failed delivery.
    ///
    /// # Errors
    /// - `DeliveryError::InvalidConfiguration` - URL is not absolute http(s)
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let mut url = Url::parse(webhook_url).map_err(|e| DeliveryError::InvalidConfiguration {
            message: format!("Invalid webhook URL: {}", e),
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(DeliveryError::InvalidConfiguration {
                message: format!("Webhook URL must use http or https, got '{}'", url.scheme()),
            });
        }

        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "wait")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("wait", "true");

        let destination = format!("webhook {}", url.host_str().unwrap_or("<unknown host>"));

        Ok(Self {
            client: build_client(timeout)?,
            url,
            destination,
            timeout,
        })
    }

    /// Log-safe description of the target
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("destination", &self.destination)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, message), fields(destination = %self.destination))]
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        if let Destination::Channel(channel) = &message.destination {
            debug!(
                channel = %channel,
                "Webhook delivery cannot target a routed channel; using configured webhook"
            );
        }

        let response = self
            .client
            .post(self.url.clone())
            .json(&MessagePayload {
                content: &message.body,
            })
            .send()
            .await
            .map_err(|e| DeliveryError::from_request(&self.destination, self.timeout, e))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(DeliveryReceipt {
                destination: self.destination.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            destination: self.destination.clone(),
            status: status.as_u16(),
            body,
        })
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Webhook
    }
}
