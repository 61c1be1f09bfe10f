//! Command-line interface.
//!
//! Flags override every other configuration source. Credential flags can
//! also be supplied through their environment variables so they never need
//! to appear on a command line.

use clap::Parser;
use std::path::PathBuf;
use vikunja_relay_api::ServiceConfig;
use vikunja_relay_core::{BotToken, ChannelId, DeliveryMode};

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

/// Vikunja Relay - forward Vikunja task events to Discord
#[derive(Parser)]
#[command(name = "vikunja-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Relay Vikunja task-created events to Discord")]
#[command(
    long_about = "Receives Vikunja task webhooks on POST / and posts a notification to Discord, \
                  either through a fixed webhook URL or an authenticated bot session, optionally \
                  routing by the project code in the task identifier"
)]
pub struct Cli {
    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind HTTP server
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind HTTP server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Delivery mode: webhook or session
    #[arg(short, long)]
    pub mode: Option<DeliveryMode>,

    /// Discord bot token (session mode)
    #[arg(short = 't', long = "token", env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Discord webhook URL (webhook mode)
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Default channel for unrouted messages (session mode)
    #[arg(long)]
    pub channel: Option<String>,

    /// Routing table file; enables project-code routing
    #[arg(short, long, env = "RELAY_ROUTING_FILE")]
    pub routing_file: Option<PathBuf>,

    /// Acknowledge malformed bodies and unsupported events with 200
    #[arg(long)]
    pub permissive: bool,

    /// Logging level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Apply flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(mode) = self.mode {
            config.delivery.mode = mode;
        }
        if let Some(token) = &self.token {
            config.delivery.bot_token = Some(BotToken::new(token.clone()));
        }
        if let Some(url) = &self.webhook_url {
            config.delivery.webhook_url = Some(url.clone());
        }
        if let Some(channel) = &self.channel {
            config.delivery.default_channel_id = Some(ChannelId::new(channel.clone()));
        }
        if let Some(path) = &self.routing_file {
            config.routing.enabled = true;
            config.routing.file = Some(path.clone());
        }
        if self.permissive {
            config.intake.strict_validation = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json_format = true;
        }
    }
}
