//! Probe Stream Ingest
//!
//! Accepts a probe encoder's chunked POST body and feeds it through the
//! stream-to-frame bridge. The request stays open for the lifetime of the
//! encoder's connection; the response is sent only once the body stream
//! ends.

use axum::{
    body::Body,
    extract::{Path, State},
    Json,
};
use futures_util::TryStreamExt;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::hub::bridge;

/// Summary returned to the encoder once its stream ends.
#[derive(Debug, Serialize)]
pub struct StreamReport {
    pub channel: u16,
    pub frames: u64,
}

/// POST /v1/probe/stream/{id}
pub async fn probe_stream(
    Path(channel): Path<u16>,
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<Json<StreamReport>> {
    let hub = state
        .probe_hub(channel)
        .ok_or_else(|| ApiError::NotFound(format!("no probe channel {channel}")))?;

    tracing::info!(channel, "probe stream connected");

    let reader = StreamReader::new(
        body.into_data_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e)),
    );
    let frames = bridge::run(reader, &hub).await;

    tracing::info!(channel, frames, "probe stream disconnected");

    Ok(Json(StreamReport { channel, frames }))
}
