//! Configuration types for the relay service
//!
//! Every section carries serde defaults so that a partially specified source
//! (file, environment, CLI) still produces a complete [`ServiceConfig`].
//! Credentials have no defaults; [`ServiceConfig::validate`] rejects a
//! configuration that lacks the ones its delivery mode needs.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use vikunja_relay_core::{delivery::DEFAULT_API_BASE, BotToken, ChannelId, DeliveryMode};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Request intake behaviour
    pub intake: IntakeConfig,

    /// Project-code routing
    pub routing: RoutingConfig,

    /// Outbound delivery
    pub delivery: DeliveryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate the configuration before any component is built.
    ///
    /// # Errors
    /// - `ConfigError::Missing` - a credential or path required by the
    ///   selected mode is absent
    /// - `ConfigError::Invalid` - a value is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }

        if self.delivery.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "delivery.timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.routing.enabled && self.routing.file.is_none() {
            return Err(ConfigError::Missing {
                key: "routing.file".to_string(),
                hint: "set --routing-file or RELAY_ROUTING_FILE".to_string(),
            });
        }

        match self.delivery.mode {
            DeliveryMode::Webhook => {
                if is_blank(self.delivery.webhook_url.as_deref()) {
                    return Err(ConfigError::Missing {
                        key: "delivery.webhook_url".to_string(),
                        hint: "set --webhook-url or DISCORD_WEBHOOK_URL".to_string(),
                    });
                }
            }
            DeliveryMode::Session => {
                if self.delivery.bot_token.as_ref().map_or(true, BotToken::is_empty) {
                    return Err(ConfigError::Missing {
                        key: "delivery.bot_token".to_string(),
                        hint: "set --token or DISCORD_BOT_TOKEN".to_string(),
                    });
                }

                let has_default_channel = self.delivery.default_channel().is_some();
                if !self.routing.enabled && !has_default_channel {
                    return Err(ConfigError::Missing {
                        key: "delivery.default_channel_id".to_string(),
                        hint: "session delivery without routing needs --channel".to_string(),
                    });
                }

                if self.delivery.startup_message.is_some() && !has_default_channel {
                    return Err(ConfigError::Invalid {
                        message: "delivery.startup_message requires delivery.default_channel_id"
                            .to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4030,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Intake configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Reject malformed bodies (400) and unsupported events (501).
    ///
    /// When false both are logged and acknowledged with 200.
    pub strict_validation: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            strict_validation: true,
        }
    }
}

/// Routing configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Resolve channel and role from the task's project code
    pub enabled: bool,

    /// Routing table file (JSON, or YAML by extension)
    pub file: Option<PathBuf>,
}

/// Delivery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Delivery mechanism
    pub mode: DeliveryMode,

    /// Discord webhook URL (webhook mode)
    pub webhook_url: Option<String>,

    /// Discord bot token (session mode)
    pub bot_token: Option<BotToken>,

    /// Channel for messages that routing did not target (session mode)
    pub default_channel_id: Option<ChannelId>,

    /// Discord REST API base URL
    pub api_base_url: String,

    /// Bound on each outbound call in seconds
    pub timeout_seconds: u64,

    /// Message posted to the default channel once the session is connected
    pub startup_message: Option<String>,
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Configured default channel, ignoring blank values
    pub fn default_channel(&self) -> Option<&ChannelId> {
        self.default_channel_id.as_ref().filter(|c| !c.is_empty())
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            webhook_url: None,
            bot_token: None,
            default_channel_id: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout_seconds: 10,
            startup_message: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level or `EnvFilter` directive
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
