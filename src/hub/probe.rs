//! Probe Hub
//!
//! Actor-style hub for probe video clients. A single spawned task owns the
//! membership map; registration, unregistration, and broadcast all arrive as
//! commands on one channel, so membership is only ever mutated by the loop
//! itself and no lock guards it.
//!
//! Each client owns a bounded outbound buffer drained by its own writer task.
//! A client whose buffer is full when a frame arrives is treated as slow and
//! unregistered; the frame is dropped for that client, never queued
//! indefinitely. That keeps one stalled viewer from holding back the stream
//! for everyone else.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Default per-client outbound buffer, in frames.
pub const DEFAULT_BUFFER_FRAMES: usize = 32;

enum ProbeCommand {
    Register {
        id: Uuid,
        frames: mpsc::Sender<Bytes>,
    },
    Unregister(Uuid),
    Broadcast(Bytes),
    ClientCount(oneshot::Sender<usize>),
}

/// Handle to a probe hub actor. Cloneable; all clones feed the same loop.
#[derive(Clone)]
pub struct ProbeHub {
    channel: u16,
    commands: mpsc::UnboundedSender<ProbeCommand>,
}

impl ProbeHub {
    /// Spawn the actor loop for one probe channel and return its handle.
    pub fn spawn(channel: u16) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(channel, tx.downgrade(), rx));
        Self {
            channel,
            commands: tx,
        }
    }

    /// The probe channel this hub serves.
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Add a client. `frames` is the client's bounded outbound buffer.
    pub fn register(&self, id: Uuid, frames: mpsc::Sender<Bytes>) {
        let _ = self.commands.send(ProbeCommand::Register { id, frames });
    }

    /// Remove a client. Idempotent.
    pub fn unregister(&self, id: Uuid) {
        let _ = self.commands.send(ProbeCommand::Unregister(id));
    }

    /// Queue one frame for delivery to every registered client.
    pub fn broadcast(&self, frame: Bytes) {
        let _ = self.commands.send(ProbeCommand::Broadcast(frame));
    }

    /// Number of registered clients, as seen after all previously queued
    /// commands have been processed.
    pub async fn client_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(ProbeCommand::ClientCount(tx)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// The actor loop. Holds only a weak handle to its own command channel so the
/// loop ends once every [`ProbeHub`] clone is dropped.
async fn run(
    channel: u16,
    commands: mpsc::WeakUnboundedSender<ProbeCommand>,
    mut rx: mpsc::UnboundedReceiver<ProbeCommand>,
) {
    let mut clients: HashMap<Uuid, mpsc::Sender<Bytes>> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            ProbeCommand::Register { id, frames } => {
                clients.insert(id, frames);
                tracing::info!(channel, connection_id = %id, "probe client connected");
            }
            ProbeCommand::Unregister(id) => {
                // Dropping the sender closes the client's buffer; its writer
                // task ends once the buffer drains.
                if clients.remove(&id).is_some() {
                    tracing::info!(channel, connection_id = %id, "probe client disconnected");
                }
            }
            ProbeCommand::Broadcast(frame) => {
                for (id, frames) in &clients {
                    match frames.try_send(frame.clone()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(
                                channel,
                                connection_id = %id,
                                "probe client too slow, dropping"
                            );
                            schedule_unregister(&commands, *id);
                        }
                        Err(TrySendError::Closed(_)) => {
                            schedule_unregister(&commands, *id);
                        }
                    }
                }
            }
            ProbeCommand::ClientCount(reply) => {
                let _ = reply.send(clients.len());
            }
        }
    }

    tracing::debug!(channel, "probe hub stopped");
}

// Eviction decided during a broadcast goes back through the command channel
// instead of mutating the map mid-iteration; the loop stays the single
// writer of the membership set.
fn schedule_unregister(commands: &mpsc::WeakUnboundedSender<ProbeCommand>, id: Uuid) {
    if let Some(commands) = commands.upgrade() {
        let _ = commands.send(ProbeCommand::Unregister(id));
    }
}
