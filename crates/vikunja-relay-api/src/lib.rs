//! # Vikunja Relay HTTP Service
//!
//! HTTP server for receiving Vikunja task-event webhooks and relaying them to
//! Discord through [`TaskRelay`].
//!
//! This service provides:
//! - `POST /` task-event intake
//! - `GET /health` liveness and configuration summary
//!
//! Request handling only reads shared state: the routing table and notifier
//! are built once at startup and injected through [`AppState`].

pub mod config;
pub mod errors;
pub mod responses;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

pub use config::{
    DeliveryConfig, IntakeConfig, LoggingConfig, RoutingConfig, ServerConfig, ServiceConfig,
};
pub use errors::{ConfigError, IntakeError, ServiceError};
pub use responses::{HealthResponse, IntakeResponse, IGNORED_MESSAGE, SENT_MESSAGE};

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};
use vikunja_relay_core::{TaskEvent, TaskRelay};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Route → format → deliver pipeline
    pub relay: TaskRelay,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig, relay: TaskRelay) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route(
            "/",
            post(handle_task_event).fallback(handle_method_not_allowed),
        )
        .route("/health", get(handle_health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Binds `server.host:server.port` and serves until SIGINT or SIGTERM.
pub async fn start_server(config: ServiceConfig, relay: TaskRelay) -> Result<(), ServiceError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let app = create_router(AppState::new(config, relay));

    serve_with_shutdown(listener, app, shutdown_timeout, shutdown_signal()).await
}

/// Serve `app` until `shutdown` resolves, then drain in-flight requests.
///
/// The server stops accepting connections as soon as `shutdown` completes.
/// In-flight requests get `shutdown_timeout` to finish before the server
/// returns regardless.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    shutdown_timeout: Duration,
    shutdown: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    });

    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(shutdown_timeout).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = async { server.await } => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = drain_deadline => {
            warn!(
                timeout_seconds = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out; abandoning in-flight requests"
            );
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

// ============================================================================
// Intake Handlers
// ============================================================================

/// Handle a Vikunja task-event webhook
///
/// 1. Decode the body (strict: 400 on failure; permissive: continue with an
///    empty event)
/// 2. Only `task.created` is relayed (strict: 501 otherwise; permissive: 200)
/// 3. Route, format and deliver through the relay
/// 4. Answer 200 once Discord accepted the message, 500 otherwise
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn handle_task_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<IntakeResponse, IntakeError> {
    let strict = state.config.intake.strict_validation;

    let event = match TaskEvent::from_slice(&body) {
        Ok(event) => event,
        Err(e) if strict => {
            return Err(IntakeError::BadRequest {
                message: e.to_string(),
            })
        }
        Err(e) => {
            warn!(error = %e, "Undecodable task event; continuing with an empty event");
            TaskEvent::default()
        }
    };

    info!(
        event_name = %event.event_name,
        identifier = %event.task().identifier,
        "Received task event"
    );

    if !event.is_task_created() {
        if strict {
            return Err(IntakeError::UnsupportedEvent {
                event_name: event.event_name,
            });
        }
        info!(event_name = %event.event_name, "Ignoring unsupported event");
        return Ok(IntakeResponse::Ignored);
    }

    state.relay.relay(&event).await?;

    Ok(IntakeResponse::Sent)
}

/// Reject every method other than POST on the intake path
async fn handle_method_not_allowed() -> IntakeError {
    IntakeError::MethodNotAllowed
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic health check endpoint
async fn handle_health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        delivery_mode: state.relay.delivery_mode().to_string(),
        routing_enabled: state.relay.routing_enabled(),
    })
}
