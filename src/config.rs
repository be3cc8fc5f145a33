//! Configuration System
//!
//! Handles loading configuration from a TOML file, with serde defaults for
//! every field so a partial (or absent) file still yields a runnable
//! gateway. Environment variable overrides are applied at the binary edge
//! (see `main.rs`). Probe channel edits made through the API are saved back
//! to the same file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::hub::DEFAULT_BUFFER_FRAMES;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built web UI, served with SPA fallback
    #[serde(default = "default_ui_dir")]
    pub ui_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ui_dir() -> String {
    "./dist".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ui_dir: default_ui_dir(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Matrix router configuration.
///
/// `ip` and `address` describe where the physical router lives; they are
/// consumed by the device driver behind `RouterBackend`, not by the gateway
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_router_ip")]
    pub ip: String,

    /// T-Bus address of the router frame
    #[serde(default = "default_router_address")]
    pub address: u8,

    #[serde(default = "default_router_model")]
    pub model: String,

    #[serde(default = "default_inputs")]
    pub inputs: u16,

    #[serde(default = "default_outputs")]
    pub outputs: u16,

    /// Panel label file; missing file is logged and ignored
    #[serde(default = "default_labels_file")]
    pub labels_file: String,
}

fn default_router_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_router_address() -> u8 {
    254
}

fn default_router_model() -> String {
    "NK-3G16".to_string()
}

fn default_inputs() -> u16 {
    16
}

fn default_outputs() -> u16 {
    16
}

fn default_labels_file() -> String {
    "labels.lbl".to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ip: default_router_ip(),
            address: default_router_address(),
            model: default_router_model(),
            inputs: default_inputs(),
            outputs: default_outputs(),
            labels_file: default_labels_file(),
        }
    }
}

/// Probe streaming configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub channels: Vec<ProbeChannelConfig>,
}

/// One probe channel: an ingest path plus a viewer socket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeChannelConfig {
    pub id: u16,

    #[serde(default)]
    pub label: String,

    /// Router destination feeding this probe's encoder, 0 when unpatched
    #[serde(default)]
    pub router_destination: u16,

    /// Per-viewer outbound buffer, in frames
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: usize,
}

fn default_buffer_frames() -> usize {
    DEFAULT_BUFFER_FRAMES
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unable to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Write the configuration back as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location (`<config dir>/crosspoint/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crosspoint").join("config.toml"))
    }

    /// Look up a probe channel by id.
    pub fn probe_channel(&self, id: u16) -> Option<&ProbeChannelConfig> {
        self.probe.channels.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.router.inputs, 16);
        assert!(!config.probe.enabled);
        assert!(config.probe.channels.is_empty());
    }

    #[test]
    fn partial_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [router]
            model = "NK-3G72"
            inputs = 72
            outputs = 72

            [probe]
            enabled = true

            [[probe.channels]]
            id = 1
            label = "Studio A"
            router_destination = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.router.outputs, 72);
        assert!(config.probe.enabled);

        let channel = config.probe_channel(1).unwrap();
        assert_eq!(channel.label, "Studio A");
        assert_eq!(channel.router_destination, 12);
        assert_eq!(channel.buffer_frames, DEFAULT_BUFFER_FRAMES);
        assert!(config.probe_channel(2).is_none());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(toml::from_str::<Config>("server = 12").is_err());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.port = 8090;
        config.probe.enabled = true;
        config.probe.channels.push(ProbeChannelConfig {
            id: 3,
            label: "Probe 3".to_string(),
            router_destination: 7,
            buffer_frames: 16,
        });

        config.save(&path).unwrap();
        let reloaded = Config::load(&path).unwrap();

        assert_eq!(reloaded.server.port, 8090);
        assert_eq!(reloaded.probe_channel(3), Some(&config.probe.channels[0]));
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn addr_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ui_dir: default_ui_dir(),
        };
        assert_eq!(server.addr(), "127.0.0.1:8080");
    }
}
