//! Axum-based HTTP server for the train command API.
//!
//! Provides endpoints for:
//! - GET `/api/train/:channel/speed/:speed` - Set a channel's speed
//! - GET `/api/train/:channel/stop` - Brake a channel
//! - GET `/api` - Usage hint
//! - GET `/api/deliveries` - Recent transmission outcomes
//! - GET `/api/pins` - Last known input pin levels
//!
//! Train command responses are HTTP 200 whether or not the input was valid;
//! the body says which.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{WebConfig, DEFAULT_PORT};
use crate::traits::Transmitter;

use super::api::{ApiReply, DeliveriesResponse, PinsResponse, UsageResponse};
use super::http_handler::HttpApiHandler;
use super::shared::SharedState;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/train/:channel/speed/:speed
async fn set_speed<T: Transmitter + 'static>(
    State(state): State<Arc<SharedState<T>>>,
    Path((channel, speed)): Path<(String, String)>,
) -> Json<ApiReply> {
    Json(HttpApiHandler::new(state).handle_set_speed(&channel, &speed))
}

/// GET /api/train/:channel/stop
async fn stop<T: Transmitter + 'static>(
    State(state): State<Arc<SharedState<T>>>,
    Path(channel): Path<String>,
) -> Json<ApiReply> {
    Json(HttpApiHandler::new(state).handle_stop(&channel))
}

/// GET /api
async fn usage<T: Transmitter + 'static>(
    State(state): State<Arc<SharedState<T>>>,
) -> Json<UsageResponse> {
    Json(HttpApiHandler::new(state).handle_usage())
}

/// GET /api/deliveries
async fn deliveries<T: Transmitter + 'static>(
    State(state): State<Arc<SharedState<T>>>,
) -> Json<DeliveriesResponse> {
    Json(HttpApiHandler::new(state).handle_deliveries())
}

/// GET /api/pins
async fn pins<T: Transmitter + 'static>(
    State(state): State<Arc<SharedState<T>>>,
) -> Json<PinsResponse> {
    Json(HttpApiHandler::new(state).handle_pins())
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiReply::error("Not found")))
}

async fn log_request(request: Request, next: Next) -> Response {
    log::info!("Request: {}", request.uri());
    next.run(request).await
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: ([0, 0, 0, 0], DEFAULT_PORT).into(),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<T: Transmitter + 'static>(
    state: Arc<SharedState<T>>,
    config: &WebServerConfig,
) -> Router {
    let mut router = Router::new()
        .route("/api", get(usage::<T>))
        .route("/api/", get(usage::<T>))
        .route("/api/train/:channel/speed/:speed", get(set_speed::<T>))
        .route("/api/train/:channel/stop", get(stop::<T>))
        .route("/api/deliveries", get(deliveries::<T>))
        .route("/api/pins", get(pins::<T>))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(middleware::from_fn(log_request))
}

/// Start the web server with shared state
///
/// Runs until Ctrl-C. Share `state` with the pin monitor to expose pin
/// levels over `/api/pins`.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedState::new(IrSendTransmitter::default()));
/// let _monitor = spawn_pin_monitor(inputs, Arc::clone(&state));
/// run_server_with_state(state, web_config).await?;
/// ```
pub async fn run_server_with_state<T: Transmitter + 'static>(
    state: Arc<SharedState<T>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Magic happens on port {}", config.addr.port());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("shutting down"),
        Err(e) => {
            log::error!("unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
