//! Layered configuration loading.
//!
//! Sources (applied in order - later sources override earlier ones):
//!  1. Built-in defaults from [`ServiceConfig`]
//!  2. `config/relay.{yaml,toml,json}`  - deployment-local file, optional
//!  3. Explicit file from `--config` / `RELAY_CONFIG`, required when given
//!  4. Environment variables prefixed `RELAY__` (double-underscore separator),
//!     e.g. `RELAY__SERVER__PORT=4031` sets `server.port`
//!
//! CLI flags are applied afterwards by [`crate::cli::Cli::apply_overrides`].

use config::{Config, Environment, File};
use std::path::Path;
use tracing::info;
use vikunja_relay_api::ServiceConfig;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Environment variable prefix for configuration keys.
pub const ENV_PREFIX: &str = "RELAY";

/// Deployment-local configuration file, without extension.
pub const LOCAL_CONFIG_FILE: &str = "config/relay";

/// Load configuration from files and the environment.
///
/// # Errors
/// A missing explicit file, a malformed file, or an environment value that
/// cannot be coerced to the field type is an error. Absent optional files
/// are not.
pub fn load_config(explicit_path: Option<&Path>) -> Result<ServiceConfig, config::ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name(LOCAL_CONFIG_FILE).required(false));

    if let Some(path) = explicit_path {
        info!(path = %path.display(), "Loading configuration from explicit path");
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}
