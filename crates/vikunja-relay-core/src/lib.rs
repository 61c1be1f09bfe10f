//! # Vikunja Relay Core
//!
//! Core business logic for relaying Vikunja task events to Discord.
//!
//! This crate contains the domain logic for decoding task events, resolving the
//! destination channel from the project code embedded in a task identifier,
//! formatting the notification text, and delivering it through one of the
//! supported Discord transports.
//!
//! ## Architecture
//!
//! - [`event`]: the inbound [`TaskEvent`] payload.
//! - [`routing`]: the static project-code [`RoutingTable`].
//! - [`message`]: notification formatting.
//! - [`delivery`]: the [`Notifier`] trait and its webhook and session
//!   implementations.
//! - [`relay`]: the single route → format → deliver pipeline.
//!
//! Business logic depends only on the [`Notifier`] abstraction; the concrete
//! transport is injected at startup.
//!
//! ## Usage
//!
//! ```rust
//! use vikunja_relay_core::routing::{ProjectCode, RoutingEntry, RoutingTable};
//!
//! let table = RoutingTable::from_entries([(
//!     "ENG".to_string(),
//!     RoutingEntry::new("C1", "R1"),
//! )]);
//!
//! let route = table.resolve("ENG-1234").unwrap();
//! assert_eq!(route.project, ProjectCode::from_identifier("ENG-1234").unwrap());
//! assert_eq!(route.channel_id.as_str(), "C1");
//! ```

pub mod delivery;
pub mod event;
pub mod message;
pub mod relay;
pub mod routing;

pub use delivery::{
    BotToken, ChannelId, DeliveryError, DeliveryMode, DeliveryReceipt, Destination, Notifier,
    OutboundMessage,
};
pub use event::{Doer, Task, TaskEvent, TASK_CREATED};
pub use relay::{RelayError, TaskRelay};
pub use routing::{ProjectCode, Route, RoutingEntry, RoutingError, RoutingTable};
