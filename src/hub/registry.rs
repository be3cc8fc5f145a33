//! Connection Registry
//!
//! Concurrency-safe set of live push connections. Each entry pairs a fresh
//! `Uuid` identity with the connection's outbound channel sender; the
//! transport itself is owned by the connection's own tasks, never by the
//! registry.
//!
//! The single mutex is held only around map mutation or copy, never across
//! I/O or an `.await` point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

/// Registry of live connections keyed by identity.
///
/// Generic over the frame type carried by each connection's outbound channel.
pub struct ConnectionRegistry<T> {
    connections: Mutex<HashMap<Uuid, mpsc::UnboundedSender<T>>>,
}

impl<T> ConnectionRegistry<T> {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a connection unconditionally, assigning a fresh identity.
    pub fn add(&self, sender: mpsc::UnboundedSender<T>) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, sender);
        id
    }

    /// Remove a connection if present. Idempotent: removing an identity that
    /// was already removed (or never existed) is a no-op.
    ///
    /// Returns whether an entry was actually removed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Copy of the membership at a single instant.
    ///
    /// Connections added after the call do not appear; a connection removed
    /// concurrently may still appear, but never twice.
    pub fn snapshot(&self) -> Vec<(Uuid, mpsc::UnboundedSender<T>)> {
        self.lock()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another thread panicked mid-operation; the
    // map itself is never left in a torn state, so keep serving.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::UnboundedSender<T>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ConnectionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
