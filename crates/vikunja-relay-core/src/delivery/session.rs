//! Bot-session delivery through the Discord REST API.
//!
//! A [`DiscordSession`] is created once at startup by
//! [`DiscordSession::connect`], which verifies the bot token before the
//! listener accepts traffic. The session is then shared by all request
//! handlers; `reqwest::Client` is safe for concurrent use.

use super::{
    build_client, BotToken, ChannelId, DeliveryError, DeliveryMode, DeliveryReceipt, Destination,
    MessagePayload, Notifier, OutboundMessage,
};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument};
use url::Url;

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// Discord REST API base used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Channel message sending through an already-connected bot session
#[async_trait]
pub trait BotSession: Send + Sync {
    /// Post `content` to `channel`.
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Identity of the connected bot user
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
}

/// Authenticated Discord REST session
pub struct DiscordSession {
    client: reqwest::Client,
    api_base: String,
    token: BotToken,
    user: BotUser,
    timeout: Duration,
}

impl DiscordSession {
    /// Open a session by validating `token` against `GET /users/@me`.
    ///
    /// # Errors
    /// - `DeliveryError::InvalidConfiguration` - empty token or bad API base
    /// - `DeliveryError::Authentication` - Discord rejected the token
    /// - `DeliveryError::Rejected` / `Transport` / `Timeout` - other failures
    #[instrument(skip(token))]
    pub async fn connect(
        token: BotToken,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        if token.is_empty() {
            return Err(DeliveryError::InvalidConfiguration {
                message: "Bot token is empty".to_string(),
            });
        }

        Url::parse(api_base).map_err(|e| DeliveryError::InvalidConfiguration {
            message: format!("Invalid Discord API base URL '{}': {}", api_base, e),
        })?;
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = build_client(timeout)?;
        let destination = "discord users/@me";

        let response = client
            .get(format!("{}/users/@me", api_base))
            .header(AUTHORIZATION, token.authorization())
            .send()
            .await
            .map_err(|e| DeliveryError::from_request(destination, timeout, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DeliveryError::Authentication {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                destination: destination.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let user: BotUser = response
            .json()
            .await
            .map_err(|e| DeliveryError::from_request(destination, timeout, e))?;

        info!(bot_id = %user.id, bot_name = %user.username, "Discord session established");

        Ok(Self {
            client,
            api_base,
            token,
            user,
            timeout,
        })
    }

    /// The bot user this session is authenticated as
    pub fn user(&self) -> &BotUser {
        &self.user
    }
}

impl std::fmt::Debug for DiscordSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSession")
            .field("api_base", &self.api_base)
            .field("user", &self.user)
            .field("token", &self.token)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl BotSession for DiscordSession {
    #[instrument(skip(self, content), fields(channel = %channel))]
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let destination = format!("channel {}", channel);

        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_base, channel))
            .header(AUTHORIZATION, self.token.authorization())
            .json(&MessagePayload { content })
            .send()
            .await
            .map_err(|e| DeliveryError::from_request(&destination, self.timeout, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(DeliveryReceipt {
                destination,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            destination,
            status: status.as_u16(),
            body,
        })
    }
}

/// [`Notifier`] backed by a shared [`BotSession`]
pub struct SessionNotifier {
    session: Arc<dyn BotSession>,
    default_channel: Option<ChannelId>,
}

impl SessionNotifier {
    /// `default_channel` receives messages that routing did not target.
    pub fn new(session: Arc<dyn BotSession>, default_channel: Option<ChannelId>) -> Self {
        Self {
            session,
            default_channel: default_channel.filter(|c| !c.is_empty()),
        }
    }
}

#[async_trait]
impl Notifier for SessionNotifier {
    #[instrument(skip(self, message), fields(channel = tracing::field::Empty))]
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let channel = match &message.destination {
            Destination::Channel(channel) => channel,
            Destination::Default => self
                .default_channel
                .as_ref()
                .ok_or(DeliveryError::NoChannel)?,
        };
        tracing::Span::current().record("channel", tracing::field::display(channel));

        self.session.send_message(channel, &message.body).await
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Session
    }
}
