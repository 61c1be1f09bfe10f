//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;
use vikunja_relay_core::RelayError;

/// Intake errors with HTTP status code mapping
///
/// Every variant produces exactly one short plain-text response:
///
/// - `400 Bad Request`: the body is not a decodable task event (strict mode)
/// - `405 Method Not Allowed`: anything other than `POST`
/// - `500 Internal Server Error`: the project could not be routed, or
///   Discord did not accept the message
/// - `501 Not Implemented`: an event other than `task.created` (strict mode)
///
/// Routing and delivery failures are logged with their destination by the
/// relay pipeline before they reach this type; the client only sees a short
/// reason.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// Malformed request body
    #[error("Failed to parse JSON: {message}")]
    BadRequest { message: String },

    /// Request used a method other than POST
    #[error("Invalid request method")]
    MethodNotAllowed,

    /// Event name other than `task.created`
    #[error("Unsupported event: {event_name}")]
    UnsupportedEvent { event_name: String },

    /// Routing or delivery failed
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntakeError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedEvent { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing reason
    ///
    /// Decoder and Discord error details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest { .. } => "Failed to parse JSON".to_string(),
            Self::MethodNotAllowed => "Invalid request method".to_string(),
            Self::UnsupportedEvent { .. } => self.to_string(),
            Self::Relay(e) if e.is_unknown_project() => e.to_string(),
            Self::Relay(_) => "Failed to send message to Discord".to_string(),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let Self::BadRequest { ref message } = self {
            warn!(error = %message, "Rejected undecodable request body");
        }

        (status, self.public_message()).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key} ({hint})")]
    Missing { key: String, hint: String },
}
