//! # Vikunja Relay
//!
//! Binary entry point for the Vikunja to Discord relay.
//!
//! This executable:
//! - Loads `.env`, configuration files and environment overrides
//! - Applies command-line flags on top
//! - Initializes logging
//! - Builds the relay pipeline (routing table, Discord notifier)
//! - Starts the HTTP server from vikunja-relay-api

use clap::Parser;
use tracing::{error, info};
use vikunja_relay_api::{start_server, LoggingConfig};
use vikunja_relay_service::{build_relay, logging, settings, Cli, StartupError};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match settings::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&LoggingConfig::default());
            fail(StartupError::Load(e));
        }
    };
    cli.apply_overrides(&mut config);

    logging::init(&config.logging);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %config.delivery.mode,
        routing = config.routing.enabled,
        strict = config.intake.strict_validation,
        "Starting Vikunja relay"
    );

    let relay = match build_relay(&config).await {
        Ok(relay) => relay,
        Err(e) => fail(e),
    };

    if let Err(e) = start_server(config, relay).await {
        fail(StartupError::Server(e));
    }
}

fn fail(e: StartupError) -> ! {
    error!(error = %e, "Relay aborted");
    std::process::exit(e.exit_code());
}
