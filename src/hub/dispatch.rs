//! Command Dispatcher
//!
//! Decodes inbound messages from matrix control clients and forwards them to
//! the router backend. Decode policy: an unreadable envelope or payload
//! costs exactly that one message, never the connection — only transport
//! errors end a connection, and those are handled by the socket tasks.

use crate::hub::messages::{Envelope, RouteRequest};
use crate::router::RouterBackend;

/// Handle one raw text message from a command-capable connection.
pub async fn dispatch(backend: &dyn RouterBackend, raw: &str) {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable command envelope, message dropped");
            return;
        }
    };

    match envelope.kind.as_str() {
        "route_request" => {
            let request: RouteRequest = match envelope
                .data
                .as_deref()
                .map(|data| serde_json::from_str(data.get()))
            {
                Some(Ok(request)) => request,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "unreadable route request, message dropped");
                    return;
                }
                None => {
                    tracing::debug!("route request without data, message dropped");
                    return;
                }
            };

            tracing::info!(
                source = request.source,
                destination = request.destination,
                "route requested"
            );
            // Fire-and-forget from the client's point of view: failures are
            // logged, the next state change reaches it via broadcast anyway.
            if let Err(e) = backend.route(request.destination, request.source).await {
                tracing::warn!(error = %e, "route request failed");
            }
        }
        other => {
            tracing::trace!(kind = %other, "ignoring unrecognized command type");
        }
    }
}
