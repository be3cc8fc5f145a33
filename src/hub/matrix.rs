//! Matrix Hub
//!
//! Fan-out hub for matrix control clients. Membership lives in a
//! mutex-guarded [`ConnectionRegistry`]; every mutation site is a plain
//! add/remove/snapshot, so no actor loop is needed for this connection class.
//!
//! Broadcasting serializes the event once, snapshots the registry, and pushes
//! the text to each connection's outbound channel. A failed send marks the
//! connection stale and it is evicted after the iteration; the caller never
//! sees per-connection failures.

use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::MatrixEvent;
use super::registry::ConnectionRegistry;

/// Hub for the matrix control connection class.
pub struct MatrixHub {
    registry: ConnectionRegistry<String>,
}

impl MatrixHub {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    /// Register a connection's outbound channel, returning its identity.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> Uuid {
        let id = self.registry.add(sender);
        tracing::info!(connection_id = %id, "matrix client connected");
        id
    }

    /// Remove a connection. Safe to call more than once for the same identity.
    pub fn unregister(&self, id: Uuid) {
        if self.registry.remove(id) {
            tracing::info!(connection_id = %id, "matrix client disconnected");
        }
    }

    /// Number of currently registered connections.
    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    /// Deliver an event to every registered connection, best-effort.
    pub fn broadcast(&self, event: &MatrixEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize matrix event");
                return;
            }
        };
        self.broadcast_text(text);
    }

    fn broadcast_text(&self, text: String) {
        let snapshot = self.registry.snapshot();
        let mut stale = Vec::new();

        for (id, sender) in snapshot {
            // Unbounded channel: send never blocks and fails only once the
            // connection's writer task is gone.
            if sender.send(text.clone()).is_err() {
                stale.push(id);
            }
        }

        for id in stale {
            if self.registry.remove(id) {
                tracing::debug!(connection_id = %id, "evicted closed matrix connection");
            }
        }
    }
}

impl Default for MatrixHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::messages::{DestinationUpdate, SourceUpdate};

    fn update(id: u16) -> MatrixEvent {
        MatrixEvent::DestinationUpdate(DestinationUpdate {
            id,
            label: format!("DEST {id}"),
            source: SourceUpdate {
                id: 1,
                label: "SRC 1".to_string(),
            },
        })
    }

    #[tokio::test]
    async fn broadcast_reaches_all_clients_in_order() {
        let hub = MatrixHub::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.register(tx_a);
        hub.register(tx_b);

        for id in 1..=3 {
            hub.broadcast(&update(id));
        }

        for rx in [&mut rx_a, &mut rx_b] {
            for id in 1..=3 {
                let text = rx.try_recv().unwrap();
                assert!(text.contains(&format!("DEST {id}")));
            }
        }
    }

    #[tokio::test]
    async fn closed_client_is_evicted_and_others_still_receive() {
        let hub = MatrixHub::new();
        let (tx_open, mut rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        hub.register(tx_open);
        hub.register(tx_closed);
        drop(rx_closed);

        hub.broadcast(&update(1));
        hub.broadcast(&update(2));

        assert_eq!(hub.client_count(), 1);
        assert!(rx_open.try_recv().is_ok());
        assert!(rx_open.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unregister_twice_is_harmless() {
        let hub = MatrixHub::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx);

        hub.unregister(id);
        hub.unregister(id);
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_registrations_all_receive_broadcast() {
        use std::sync::Arc;

        let hub = Arc::new(MatrixHub::new());
        let mut joins = Vec::new();
        let mut receivers = Vec::new();

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        for _ in 0..128 {
            let hub = Arc::clone(&hub);
            let done = done_tx.clone();
            joins.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::unbounded_channel();
                hub.register(tx);
                let _ = done.send(rx);
            }));
        }
        drop(done_tx);
        while let Some(rx) = done_rx.recv().await {
            receivers.push(rx);
        }
        for join in joins {
            join.await.unwrap();
        }

        assert_eq!(hub.client_count(), 128);
        hub.broadcast(&update(9));
        for rx in &mut receivers {
            assert!(rx.try_recv().is_ok());
        }
    }
}
