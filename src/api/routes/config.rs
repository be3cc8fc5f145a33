//! Configuration Routes
//!
//! Read the live configuration and update probe channel settings from the
//! UI. Channel edits are persisted back to the config file when one was
//! loaded at startup.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::{Config, ProbeChannelConfig};

/// GET /v1/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config.read().await.clone())
}

/// Mutable fields of a probe channel. Fields left out of the request body
/// keep their current values.
#[derive(Debug, Deserialize)]
pub struct ProbeChannelUpdate {
    pub label: Option<String>,
    pub router_destination: Option<u16>,
}

/// POST /v1/config/probe/{id}
pub async fn update_probe_channel(
    Path(id): Path<u16>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProbeChannelUpdate>,
) -> ApiResult<Json<ProbeChannelConfig>> {
    let mut config = state.config.write().await;

    let channel = config
        .probe
        .channels
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("no probe channel {id}")))?;

    if let Some(label) = update.label {
        channel.label = label;
    }
    if let Some(destination) = update.router_destination {
        channel.router_destination = destination;
    }
    let updated = channel.clone();
    tracing::info!(channel = id, label = %updated.label, "probe channel updated");

    if let Some(path) = &state.config_path {
        if let Err(e) = config.save(path) {
            tracing::warn!(error = %e, path = %path.display(), "unable to save config");
        }
    }

    Ok(Json(updated))
}
