//! Status Routes
//!
//! Liveness probe and a status summary for monitoring.
//!
//! - GET /v1/status/live - Liveness probe (process is alive)
//! - GET /v1/status - Uptime and connection counts

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::api::state::AppState;

/// GET /v1/status/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Status summary payload
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub matrix_clients: usize,
    pub probe_channels: Vec<ProbeChannelStatus>,
}

/// Per-channel probe connection count
#[derive(Debug, Serialize)]
pub struct ProbeChannelStatus {
    pub id: u16,
    pub clients: usize,
}

/// GET /v1/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut probe_channels = Vec::with_capacity(state.probe_hubs.len());
    for (id, hub) in &state.probe_hubs {
        probe_channels.push(ProbeChannelStatus {
            id: *id,
            clients: hub.client_count().await,
        });
    }
    probe_channels.sort_by_key(|c| c.id);

    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_seconds: state.uptime_seconds(),
        matrix_clients: state.matrix_hub.client_count(),
        probe_channels,
    })
}
