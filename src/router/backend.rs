//! Router Backend
//!
//! The seam between the gateway and the physical router. The hub side only
//! ever talks to [`RouterBackend`]; a device driver (serial, T-Bus over TCP,
//! ...) implements the same trait and is free to take as long as the wire
//! takes — callers must not assume `route` is fast.
//!
//! [`MatrixRouter`] is the in-process implementation backing the gateway: it
//! owns the [`Matrix`] state and publishes a [`DestinationUpdate`] on every
//! state change. Updates are handed to subscribers through a channel, never
//! by calling into hub state directly, so a change can be applied from any
//! task without touching hub internals.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

use crate::hub::messages::DestinationUpdate;
use crate::router::labels::LabelSet;
use crate::router::matrix::Matrix;

/// Errors from backend routing operations.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Destination number outside the matrix
    #[error("unknown destination {0}")]
    UnknownDestination(u16),

    /// Source number outside the matrix
    #[error("unknown source {0}")]
    UnknownSource(u16),

    /// The device link is down or rejected the operation
    #[error("router unavailable: {0}")]
    Unavailable(String),
}

/// Operations the gateway requires from a router.
#[async_trait]
pub trait RouterBackend: Send + Sync {
    /// Route `source` to `destination`.
    async fn route(&self, destination: u16, source: u16) -> Result<(), RouterError>;

    /// Snapshot of the current crosspoint state.
    async fn matrix(&self) -> Matrix;
}

/// In-process router backend holding the matrix state.
pub struct MatrixRouter {
    matrix: RwLock<Matrix>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<DestinationUpdate>>>,
}

impl MatrixRouter {
    pub fn new(matrix: Matrix) -> Self {
        Self {
            matrix: RwLock::new(matrix),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to destination updates. Every state change is delivered to
    /// every live subscriber, in the order the changes were applied.
    pub fn subscribe_updates(&self) -> mpsc::UnboundedReceiver<DestinationUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Apply panel labels to the matrix.
    pub async fn load_labels(&self, labels: &LabelSet) {
        self.matrix.write().await.apply_labels(labels);
    }

    fn publish(&self, update: DestinationUpdate) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(update.clone()).is_ok());
    }
}

#[async_trait]
impl RouterBackend for MatrixRouter {
    async fn route(&self, destination: u16, source: u16) -> Result<(), RouterError> {
        let update = self.matrix.write().await.set_route(destination, source)?;
        tracing::info!(destination, source, "routed");
        self.publish(update);
        Ok(())
    }

    async fn matrix(&self) -> Matrix {
        self.matrix.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn route_updates_matrix_and_notifies_subscribers() {
        let router = MatrixRouter::new(Matrix::new(8, 8));
        let mut updates = router.subscribe_updates();

        router.route(5, 2).await.unwrap();

        let update = updates.recv().await.unwrap();
        assert_eq!(update.id, 5);
        assert_eq!(update.source.id, 2);
        assert_eq!(router.matrix().await.destination(5).unwrap().source, 2);
    }

    #[tokio::test]
    async fn route_failure_produces_no_update() {
        let router = MatrixRouter::new(Matrix::new(2, 2));
        let mut updates = router.subscribe_updates();

        assert!(router.route(9, 1).await.is_err());
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let router = MatrixRouter::new(Matrix::new(2, 2));
        let gone = router.subscribe_updates();
        drop(gone);
        let mut live = router.subscribe_updates();

        router.route(1, 2).await.unwrap();
        router.route(2, 2).await.unwrap();

        assert_eq!(live.recv().await.unwrap().id, 1);
        assert_eq!(live.recv().await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn updates_preserve_application_order() {
        let router = MatrixRouter::new(Matrix::new(4, 4));
        let mut updates = router.subscribe_updates();

        for source in 1..=4 {
            router.route(1, source).await.unwrap();
        }
        for source in 1..=4 {
            assert_eq!(updates.recv().await.unwrap().source.id, source);
        }
    }
}
