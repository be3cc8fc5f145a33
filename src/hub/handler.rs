//! WebSocket Handlers
//!
//! Upgrade endpoints and per-connection task pairs for both connection
//! classes. Every connection runs one reader task and one writer task; the
//! writer drains the connection's own outbound channel, the reader feeds the
//! dispatcher (matrix) or is drained and discarded (probe). Neither task
//! ever touches hub membership directly — registration happens before the
//! tasks start, unregistration after the first of them ends.
//!
//! Close frames and read errors take the same path: stop the tasks and
//! unregister. Close codes show up only in the logs.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::hub::dispatch;
use crate::hub::matrix::MatrixHub;
use crate::hub::probe::ProbeHub;
use crate::router::RouterBackend;

/// GET /v1/ws/matrix
///
/// Upgrade to a matrix control connection. Registration happens only once
/// the upgrade succeeds; a failed upgrade is answered by axum with a client
/// error and leaves no trace in the hub.
pub async fn matrix_ws(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let hub = Arc::clone(&state.matrix_hub);
    let backend = Arc::clone(&state.backend);
    ws.on_upgrade(move |socket| handle_matrix_socket(socket, hub, backend))
}

async fn handle_matrix_socket(
    socket: WebSocket,
    hub: Arc<MatrixHub>,
    backend: Arc<dyn RouterBackend>,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = hub.register(tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let recv_id = connection_id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => dispatch::dispatch(backend.as_ref(), &text).await,
                Ok(Message::Close(frame)) => {
                    tracing::debug!(
                        connection_id = %recv_id,
                        code = frame.as_ref().map(|f| f.code),
                        "matrix client sent close"
                    );
                    break;
                }
                // Binary payloads have no meaning on this channel; pings are
                // answered by axum itself.
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %recv_id, error = %e, "matrix receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unregister(connection_id);
}

/// GET /v1/ws/probe/{channel}
///
/// Upgrade to a probe viewer connection for one probe channel. Unknown or
/// disabled channels are rejected before the upgrade.
pub async fn probe_ws(
    Path(channel): Path<u16>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(hub) = state.probe_hub(channel) else {
        return ApiError::NotFound(format!("no probe channel {channel}")).into_response();
    };
    let buffer_frames = state.probe_buffer_frames(channel).await;
    ws.on_upgrade(move |socket| handle_probe_socket(socket, hub, buffer_frames))
}

async fn handle_probe_socket(socket: WebSocket, hub: ProbeHub, buffer_frames: usize) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Bytes>(buffer_frames);
    let connection_id = Uuid::new_v4();
    hub.register(connection_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Binary(frame.to_vec())).await.is_err() {
                break;
            }
        }
    });

    // Probe viewers only receive; inbound traffic is drained so the
    // transport can surface errors and close frames.
    let recv_id = connection_id;
    let recv_channel = hub.channel();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Close(frame)) => {
                    tracing::debug!(
                        channel = recv_channel,
                        connection_id = %recv_id,
                        code = frame.as_ref().map(|f| f.code),
                        "probe client sent close"
                    );
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        channel = recv_channel,
                        connection_id = %recv_id,
                        error = %e,
                        "probe receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unregister(connection_id);
}
