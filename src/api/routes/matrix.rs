//! Matrix Routes
//!
//! Snapshot reads of the router's crosspoint state. Live updates reach
//! clients over the matrix WebSocket; this endpoint exists for initial page
//! loads and polling clients.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::router::Matrix;

/// GET /v1/matrix
pub async fn matrix_snapshot(State(state): State<Arc<AppState>>) -> Json<Matrix> {
    Json(state.backend.matrix().await)
}
