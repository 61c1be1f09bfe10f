//! # Delivery Module
//!
//! Outbound transports for formatted notifications.
//!
//! Two mutually exclusive mechanisms implement [`Notifier`]:
//!
//! | Mode        | Implementation                       | Target                          |
//! |-------------|--------------------------------------|---------------------------------|
//! | **Webhook** | [`webhook::WebhookNotifier`]         | fixed Discord webhook URL       |
//! | **Session** | [`session::SessionNotifier`]         | channel via the bot REST API    |
//!
//! Each delivery is a single attempt bounded by the client timeout. There is
//! no retry and no backoff; a failure is terminal for that request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod session;
pub mod webhook;

pub use session::{BotSession, DiscordSession, SessionNotifier, DEFAULT_API_BASE};
pub use webhook::WebhookNotifier;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// Default bound on a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Core Types
// ============================================================================

/// Discord channel identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discord bot token
///
/// The value is zeroed on drop and never printed by `Debug`.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the raw token
    ///
    /// Only used to build the `Authorization` header.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `Authorization` header value for bot requests
    pub(crate) fn authorization(&self) -> String {
        format!("Bot {}", self.0)
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotToken")
            .field("value", &"<REDACTED>")
            .finish()
    }
}

/// Delivery mechanism selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// POST to a fixed Discord webhook URL
    #[default]
    Webhook,
    /// Send through an authenticated bot session
    Session,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webhook => write!(f, "webhook"),
            Self::Session => write!(f, "session"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webhook" => Ok(Self::Webhook),
            "session" => Ok(Self::Session),
            other => Err(format!(
                "unknown delivery mode '{}', expected 'webhook' or 'session'",
                other
            )),
        }
    }
}

/// Where a message should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The notifier's configured target
    Default,
    /// A specific channel resolved by routing
    Channel(ChannelId),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Channel(channel) => write!(f, "channel {}", channel),
        }
    }
}

/// A formatted message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: Destination,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(destination: Destination, body: impl Into<String>) -> Self {
        Self {
            destination,
            body: body.into(),
        }
    }
}

/// Successful delivery details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Log-safe description of where the message went
    pub destination: String,

    /// HTTP status returned by Discord
    pub status: u16,
}

/// JSON body accepted by both Discord endpoints
#[derive(Debug, Serialize)]
pub(crate) struct MessagePayload<'a> {
    pub content: &'a str,
}

// ============================================================================
// Notifier Trait
// ============================================================================

/// Interface for delivering formatted notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message in a single attempt.
    ///
    /// # Errors
    /// Any failure, including a non-success HTTP status or a timeout, is
    /// returned as a [`DeliveryError`]. Nothing is retried.
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError>;

    /// Which mechanism this notifier uses
    fn mode(&self) -> DeliveryMode;
}

// ============================================================================
// Errors
// ============================================================================

/// Delivery failures
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Discord rejected message to {destination}: HTTP {status}")]
    Rejected {
        destination: String,
        status: u16,
        body: String,
    },

    #[error("Request to {destination} failed: {message}")]
    Transport {
        destination: String,
        message: String,
    },

    #[error("Request to {destination} timed out after {timeout:?}")]
    Timeout {
        destination: String,
        timeout: Duration,
    },

    #[error("No channel configured for unrouted messages")]
    NoChannel,

    #[error("Discord rejected the bot token: HTTP {status}")]
    Authentication { status: u16 },

    #[error("Invalid delivery configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl DeliveryError {
    /// Classify a `reqwest` failure for the given destination.
    pub(crate) fn from_request(destination: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                destination: destination.to_string(),
                timeout,
            }
        } else {
            Self::Transport {
                destination: destination.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Build the shared HTTP client with the delivery timeout applied.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, DeliveryError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("vikunja-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DeliveryError::InvalidConfiguration {
            message: format!("Failed to build HTTP client: {}", e),
        })
}
