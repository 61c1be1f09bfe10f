//! Tracing subscriber setup.

use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vikunja_relay_api::LoggingConfig;

/// Directive used when the configured level cannot be parsed.
const FALLBACK_DIRECTIVE: &str = "info";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Output is plain
/// text unless `json_format` is set.
pub fn init(config: &LoggingConfig) {
    let (filter, invalid_level) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(&config.level) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(FALLBACK_DIRECTIVE), Some(config.level.clone())),
        },
    };

    let json = config.json_format;
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return;
    }

    if let Some(level) = invalid_level {
        warn!(level = %level, "Invalid log level; falling back to '{}'", FALLBACK_DIRECTIVE);
    }
}
