//! # PR Notifier HTTP Service
//!
//! HTTP layer receiving GitHub webhooks for the pull request notifier.
//!
//! This service provides:
//! - the webhook endpoint (`POST /hubot/gh-pull-requests?room=<room>` by default)
//! - a health endpoint (`GET /`)
//!
//! The webhook endpoint always answers `200 OK`. Deliveries are handed to
//! the [`Notifier`] on a background task; problems with a delivery are logged,
//! never reported to GitHub.

pub mod config;
pub mod errors;

pub use config::{
    ChatConfig, GitHubConfig, LoggingConfig, NotifierSettings, ServerConfig, ServiceConfig,
};
pub use errors::{ConfigError, ServiceError};

use axum::{
    extract::{rejection::QueryRejection, DefaultBodyLimit, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use pr_notifier_core::{NotificationRequest, Notifier};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, info, instrument, warn};

/// Header carrying the GitHub event type.
pub const EVENT_TYPE_HEADER: &str = "x-github-event";

const HEALTH_PAGE: &str = "<html><body><h2>Healthy!</h2></body></html>";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Orchestrator processing each delivery
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig, notifier: Arc<Notifier>) -> Self {
        Self { config, notifier }
    }
}

/// Query parameters accepted on the webhook endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    /// Chat room to announce in
    pub room: Option<String>,

    /// Accepted for compatibility with existing hook URLs; not used
    #[serde(rename = "type")]
    pub event_filter: Option<String>,
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route(&state.config.server.webhook_path, post(handle_webhook))
        .route("/", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Runs until SIGINT or SIGTERM, then stops accepting connections and lets
/// in-flight requests finish.
pub async fn start_server(config: ServiceConfig, notifier: Arc<Notifier>) -> Result<(), ServiceError> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let shutdown_timeout = std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let app = create_router(AppState::new(config, notifier));

    let address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_signal = async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to install Ctrl+C handler");
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
                    warn!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle GitHub webhook deliveries
///
/// Answers `200 OK` immediately in every case. Processing (including the
/// settle delay) continues on a spawned task.
#[instrument(skip(state, query, headers, body), fields(event_type, room))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    query: Result<Query<WebhookQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let span = tracing::Span::current();

    let Some(event_type) = headers
        .get(EVENT_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        warn!("Dropping webhook without an {} header", EVENT_TYPE_HEADER);
        return StatusCode::OK;
    };
    span.record("event_type", event_type.as_str());

    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable query string");
            WebhookQuery::default()
        }
    };

    let room = query
        .room
        .filter(|room| !room.trim().is_empty())
        .or_else(|| state.config.chat.default_room.clone());
    let Some(room) = room else {
        warn!("Dropping webhook: no room given and no default room configured");
        return StatusCode::OK;
    };
    span.record("room", room.as_str());

    let payload = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Dropping webhook with an unparseable body");
            return StatusCode::OK;
        }
    };

    debug!("Dispatching webhook for processing");
    state
        .notifier
        .dispatch(NotificationRequest::new(event_type, room, payload));

    StatusCode::OK
}

/// Health check
pub async fn handle_health() -> Html<&'static str> {
    Html(HEALTH_PAGE)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
