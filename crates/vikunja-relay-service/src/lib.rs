//! # Vikunja Relay Service
//!
//! Process-level plumbing for the relay binary: command-line parsing,
//! layered configuration, logging setup and startup wiring.
//!
//! The HTTP surface lives in `vikunja-relay-api`; the relay pipeline lives in
//! `vikunja-relay-core`.

pub mod cli;
pub mod logging;
pub mod settings;
pub mod startup;

pub use cli::Cli;
pub use settings::load_config;
pub use startup::{build_relay, StartupError};
