//! Crosspoint HTTP API
//!
//! HTTP and WebSocket surface of the gateway, built with Axum.
//!
//! # Endpoints
//!
//! ## Real-time
//! - `GET /v1/ws/matrix` - Matrix control WebSocket (commands in, state out)
//! - `GET /v1/ws/probe/{id}` - Probe viewer WebSocket (binary frames out)
//! - `POST /v1/probe/stream/{id}` - Probe encoder ingest (chunked body)
//!
//! ## Snapshots
//! - `GET /v1/matrix` - Current crosspoint state
//! - `GET /v1/config` - Live configuration
//! - `POST /v1/config/probe/{id}` - Update a probe channel
//!
//! ## Status
//! - `GET /v1/status/live` - Liveness probe
//! - `GET /v1/status` - Uptime and connection counts
//!
//! Everything outside `/v1` serves the built web UI with an SPA fallback to
//! `index.html`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::hub;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState, ui_dir: &Path) -> Router {
    let api_routes = Router::new()
        // Real-time routes
        .route("/ws/matrix", get(hub::matrix_ws))
        .route("/ws/probe/:channel", get(hub::probe_ws))
        // Probe ingest - the encoder posts an unbounded chunked body
        .route(
            "/probe/stream/:channel",
            post(routes::stream::probe_stream).layer(DefaultBodyLimit::disable()),
        )
        // Snapshot routes
        .route("/matrix", get(routes::matrix::matrix_snapshot))
        .route("/config", get(routes::config::get_config))
        .route("/config/probe/:channel", post(routes::config::update_probe_channel))
        // Status routes
        .route("/status", get(routes::status::status))
        .route("/status/live", get(routes::status::liveness));

    // Built web UI with SPA fallback
    let ui = ServeDir::new(ui_dir).not_found_service(ServeFile::new(ui_dir.join("index.html")));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/v1", api_routes)
        .fallback_service(ui)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state, Path::new(&config.ui_dir));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Crosspoint listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Crosspoint shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
