//! Startup wiring: everything that must succeed before the listener accepts
//! traffic.
//!
//! Failures here are process-fatal. Each [`StartupError`] maps to a distinct
//! exit code so supervisors can tell configuration mistakes from Discord
//! outages.

use std::sync::Arc;
use tracing::{info, warn};
use vikunja_relay_api::{ConfigError, ServiceConfig, ServiceError};
use vikunja_relay_core::{
    delivery::{BotSession, DiscordSession, SessionNotifier, WebhookNotifier},
    DeliveryError, DeliveryMode, Notifier, RoutingError, RoutingTable, TaskRelay,
};

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;

/// Fatal startup errors
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load routing table: {0}")]
    Routing(#[from] RoutingError),

    #[error("Failed to set up Discord delivery: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    Server(#[from] ServiceError),
}

impl StartupError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Server(_) => 1,
            Self::Load(_) | Self::Config(_) => 2,
            Self::Routing(_) => 3,
            Self::Delivery(_) => 4,
        }
    }
}

/// Load the routing table when routing is enabled.
pub fn load_routing(config: &ServiceConfig) -> Result<Option<Arc<RoutingTable>>, StartupError> {
    if !config.routing.enabled {
        return Ok(None);
    }

    let path = config
        .routing
        .file
        .as_deref()
        .ok_or_else(|| ConfigError::Missing {
            key: "routing.file".to_string(),
            hint: "set --routing-file or RELAY_ROUTING_FILE".to_string(),
        })?;

    let table = RoutingTable::load_from_file(path)?;
    info!(
        path = %path.display(),
        projects = table.len(),
        "Routing table loaded"
    );

    Ok(Some(Arc::new(table)))
}

/// Build the notifier for the configured delivery mode.
///
/// Session mode connects to Discord here; an invalid token fails startup.
pub async fn build_notifier(config: &ServiceConfig) -> Result<Arc<dyn Notifier>, StartupError> {
    let delivery = &config.delivery;

    match delivery.mode {
        DeliveryMode::Webhook => {
            let url = delivery
                .webhook_url
                .as_deref()
                .ok_or_else(|| ConfigError::Missing {
                    key: "delivery.webhook_url".to_string(),
                    hint: "set --webhook-url or DISCORD_WEBHOOK_URL".to_string(),
                })?;

            let notifier = WebhookNotifier::new(url, delivery.timeout())?;
            info!(destination = %notifier.destination(), "Using webhook delivery");
            Ok(Arc::new(notifier))
        }
        DeliveryMode::Session => {
            let token = delivery
                .bot_token
                .clone()
                .ok_or_else(|| ConfigError::Missing {
                    key: "delivery.bot_token".to_string(),
                    hint: "set --token or DISCORD_BOT_TOKEN".to_string(),
                })?;

            let session =
                Arc::new(DiscordSession::connect(token, &delivery.api_base_url, delivery.timeout()).await?);

            if let (Some(message), Some(channel)) =
                (&delivery.startup_message, delivery.default_channel())
            {
                if let Err(e) = session.send_message(channel, message).await {
                    warn!(channel = %channel, error = %e, "Failed to post startup message");
                }
            }

            info!(bot = %session.user().username, "Using session delivery");
            Ok(Arc::new(SessionNotifier::new(
                session,
                delivery.default_channel().cloned(),
            )))
        }
    }
}

/// Validate the configuration and build the relay pipeline.
pub async fn build_relay(config: &ServiceConfig) -> Result<TaskRelay, StartupError> {
    config.validate()?;

    let routing = load_routing(config)?;
    let notifier = build_notifier(config).await?;

    Ok(TaskRelay::new(notifier, routing))
}
