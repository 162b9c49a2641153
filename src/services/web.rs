//! Axum-based HTTP server for the dispatcher API.
//!
//! Provides REST endpoints for:
//! - POST `/api/command` - Submit a raw command (plain text or `{"command": "..."}`)
//! - GET `/api/state` - Current dispatcher state and pending queue
//! - POST `/api/reset` - Stop, clear the queue and go idle

use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::traits::Actuator;
use crate::{Dispatcher, SubmitStatus};

use super::api::{ApiResponse, CommandRequest, CommandResponse, StateResponse};
use super::shared::SharedDispatcher;

// ============================================================================
// Route Handlers
// ============================================================================

fn status_response(status: SubmitStatus) -> Json<ApiResponse<CommandResponse>> {
    Json(ApiResponse {
        success: status.is_success(),
        data: Some(CommandResponse::from(status)),
        error: None,
    })
}

/// POST /api/command - Submit a raw command
///
/// The reply always carries the integer status; `success` mirrors its sign.
async fn submit_command<A>(
    State(state): State<Arc<SharedDispatcher<A>>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<CommandResponse>>)
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    let Ok(body_str) = std::str::from_utf8(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Body is not valid UTF-8")),
        );
    };

    let command = match CommandRequest::from_body(body_str) {
        Ok(command) => command,
        Err(err) => {
            tracing::debug!(%err, "rejecting command request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err("Invalid command request")),
            );
        }
    };

    (StatusCode::OK, status_response(state.submit(&command)))
}

/// GET /api/state - Returns current dispatcher state
async fn get_state<A>(
    State(state): State<Arc<SharedDispatcher<A>>>,
) -> Json<ApiResponse<StateResponse>>
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    let now_ms = state.now_ms();
    let response = state.with_dispatcher(|dispatcher| {
        StateResponse::new(
            &dispatcher.state(now_ms),
            dispatcher.pending().map(String::from).collect(),
        )
    });
    Json(ApiResponse::ok(response))
}

/// POST /api/reset - Stop and clear everything
async fn reset<A>(State(state): State<Arc<SharedDispatcher<A>>>) -> Json<ApiResponse<CommandResponse>>
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    status_response(state.reset())
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
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
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
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
pub fn build_router<A>(state: Arc<SharedDispatcher<A>>, config: &WebServerConfig) -> Router
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    let mut router = Router::new()
        .route("/api/command", post(submit_command::<A>))
        .route("/api/state", get(get_state::<A>))
        .route("/api/reset", post(reset::<A>))
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

    router
}

/// Start the web server
///
/// This function blocks until the server is shut down.
/// Creates its own `SharedDispatcher` - use `run_server_with_state` to share
/// it with the tick loop and other transports.
pub async fn run_server<A>(
    dispatcher: Dispatcher<A>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    let state = Arc::new(SharedDispatcher::new(dispatcher));
    run_server_with_state(state, config).await
}

/// Start the web server with shared state
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedDispatcher::new(dispatcher));
///
/// // Share state with MQTT
/// let mqtt_handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
///
/// // Run web server with same state
/// run_server_with_state(state, web_config).await?;
/// ```
pub async fn run_server_with_state<A>(
    state: Arc<SharedDispatcher<A>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    A: Actuator + Send + 'static,
    A::Error: Debug,
{
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router).await
}
