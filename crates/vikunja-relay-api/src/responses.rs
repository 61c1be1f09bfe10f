//! Response types for the intake and health endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body returned once Discord accepted the notification
pub const SENT_MESSAGE: &str = "Message sent to Discord";

/// Body returned when a non-strict intake acknowledges an event it skips
pub const IGNORED_MESSAGE: &str = "Event ignored";

/// Successful intake outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeResponse {
    /// The notification was delivered
    Sent,
    /// The event was acknowledged without action
    Ignored,
}

impl IntoResponse for IntakeResponse {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Sent => SENT_MESSAGE,
            Self::Ignored => IGNORED_MESSAGE,
        };
        (StatusCode::OK, body).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub delivery_mode: String,
    pub routing_enabled: bool,
}
