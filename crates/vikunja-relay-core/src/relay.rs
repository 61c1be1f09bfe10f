//! # Relay Pipeline
//!
//! The single route → format → deliver path shared by every configuration.
//!
//! Routing is optional. Without a [`RoutingTable`] the message goes to the
//! notifier's default target with no role mention. With one, the project code
//! of the task identifier selects the channel and role; an identifier that
//! cannot be routed stops the pipeline before anything is sent.

use crate::{
    delivery::{DeliveryError, DeliveryMode, DeliveryReceipt, Destination, Notifier, OutboundMessage},
    event::TaskEvent,
    message::format_task_created,
    routing::{RoutingError, RoutingTable},
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;

/// Relays task events to Discord
#[derive(Clone)]
pub struct TaskRelay {
    notifier: Arc<dyn Notifier>,
    routing: Option<Arc<RoutingTable>>,
}

impl TaskRelay {
    /// Create a relay; pass `routing` to enable project-code routing.
    pub fn new(notifier: Arc<dyn Notifier>, routing: Option<Arc<RoutingTable>>) -> Self {
        Self { notifier, routing }
    }

    pub fn routing_enabled(&self) -> bool {
        self.routing.is_some()
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.notifier.mode()
    }

    /// Resolve the destination and build the message text.
    ///
    /// # Errors
    /// - `RelayError::UnknownProject` - routing is enabled and the identifier
    ///   has no project code or no matching entry
    pub fn prepare(&self, event: &TaskEvent) -> Result<OutboundMessage, RelayError> {
        let Some(table) = &self.routing else {
            return Ok(OutboundMessage::new(
                Destination::Default,
                format_task_created(event, None),
            ));
        };

        let route = table.resolve(&event.task().identifier)?;
        info!(
            project = %route.project,
            channel = %route.channel_id,
            "Resolved project route"
        );

        Ok(OutboundMessage::new(
            Destination::Channel(route.channel_id),
            format_task_created(event, route.role_id.as_ref()),
        ))
    }

    /// Route, format and deliver one event.
    #[instrument(
        skip(self, event),
        fields(identifier = %event.task().identifier, mode = %self.notifier.mode())
    )]
    pub async fn relay(&self, event: &TaskEvent) -> Result<DeliveryReceipt, RelayError> {
        let message = match self.prepare(event) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Task could not be routed; nothing sent");
                return Err(e);
            }
        };

        match self.notifier.deliver(&message).await {
            Ok(receipt) => {
                info!(
                    destination = %receipt.destination,
                    status = receipt.status,
                    "Delivered task notification"
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(
                    destination = %message.destination,
                    error = %e,
                    "Failed to deliver task notification"
                );
                Err(RelayError::Delivery(e))
            }
        }
    }
}

impl std::fmt::Debug for TaskRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRelay")
            .field("mode", &self.notifier.mode())
            .field("routing_enabled", &self.routing_enabled())
            .finish()
    }
}

/// Pipeline failures for a single event
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Unknown project: {0}")]
    UnknownProject(#[from] RoutingError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl RelayError {
    pub fn is_unknown_project(&self) -> bool {
        matches!(self, Self::UnknownProject(_))
    }
}
