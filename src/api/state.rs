//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::hub::{MatrixHub, ProbeHub, DEFAULT_BUFFER_FRAMES};
use crate::router::RouterBackend;

/// Shared application state for all handlers
pub struct AppState {
    /// Router backend the dispatcher and snapshot endpoints talk to
    pub backend: Arc<dyn RouterBackend>,
    /// Hub for matrix control connections
    pub matrix_hub: Arc<MatrixHub>,
    /// Probe hubs keyed by channel id; empty when probing is disabled
    pub probe_hubs: HashMap<u16, ProbeHub>,
    /// Live configuration, mutable through the config endpoints
    pub config: RwLock<Config>,
    /// Where the config was loaded from; edits are saved back here
    pub config_path: Option<PathBuf>,
    /// Server start time for uptime tracking
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state from a loaded configuration, spawning one probe hub per
    /// configured channel when probing is enabled.
    pub fn new(
        backend: Arc<dyn RouterBackend>,
        config: Config,
        config_path: Option<PathBuf>,
    ) -> Self {
        let mut probe_hubs = HashMap::new();
        if config.probe.enabled {
            for channel in &config.probe.channels {
                probe_hubs.insert(channel.id, ProbeHub::spawn(channel.id));
            }
        }

        Self {
            backend,
            matrix_hub: Arc::new(MatrixHub::new()),
            probe_hubs,
            config: RwLock::new(config),
            config_path,
            started_at: Utc::now(),
        }
    }

    /// Look up the hub for a probe channel.
    pub fn probe_hub(&self, channel: u16) -> Option<ProbeHub> {
        self.probe_hubs.get(&channel).cloned()
    }

    /// Outbound buffer size for viewers of a probe channel.
    pub async fn probe_buffer_frames(&self, channel: u16) -> usize {
        self.config
            .read()
            .await
            .probe_channel(channel)
            .map(|c| c.buffer_frames)
            .unwrap_or(DEFAULT_BUFFER_FRAMES)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
