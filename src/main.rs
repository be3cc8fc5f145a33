//! Crosspoint Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Configuration is read from `--config <path>` when given, otherwise from
//! the default location (`<config dir>/crosspoint/config.toml`) when that
//! file exists, otherwise built from defaults. Environment variables:
//! - `CROSSPOINT_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CROSSPOINT_PORT`: Port to listen on (default: 8080)
//! - `CROSSPOINT_UI_DIR`: Directory with the built web UI (default: ./dist)
//! - `RUST_LOG`: Log level (default: info)

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crosspoint::api::{serve, AppState};
use crosspoint::config::Config;
use crosspoint::hub::MatrixEvent;
use crosspoint::router::{LabelSet, Matrix, MatrixRouter};

#[derive(Debug, Parser)]
#[command(name = "crosspoint", version, about = "Matrix router control gateway")]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crosspoint=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Crosspoint v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let (mut config, config_path) = load_config(args.config)?;
    apply_env_overrides(&mut config);
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        model = %config.router.model,
        inputs = config.router.inputs,
        outputs = config.router.outputs,
        "Router configuration loaded"
    );

    // Build the matrix and apply panel labels when the file is present
    let mut matrix = Matrix::new(config.router.inputs, config.router.outputs);
    match LabelSet::load(Path::new(&config.router.labels_file)) {
        Ok(labels) => {
            tracing::info!(count = labels.len(), "Loaded panel labels");
            matrix.apply_labels(&labels);
        }
        Err(e) => {
            tracing::warn!(
                path = %config.router.labels_file,
                error = %e,
                "Unable to load panel labels"
            );
        }
    }

    let router = Arc::new(MatrixRouter::new(matrix));
    let mut updates = router.subscribe_updates();

    if config.probe.enabled {
        tracing::info!(channels = config.probe.channels.len(), "Probe streaming enabled");
    }

    let server_config = config.server.clone();
    let backend: Arc<dyn crosspoint::router::RouterBackend> = router.clone();
    let state = AppState::new(backend, config, config_path);

    // Backend state changes reach the matrix hub only through this channel
    let matrix_hub = Arc::clone(&state.matrix_hub);
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            matrix_hub.broadcast(&MatrixEvent::DestinationUpdate(update));
        }
    });

    serve(state, &server_config)
        .await
        .context("server terminated")?;

    tracing::info!("Crosspoint stopped");
    Ok(())
}

/// Resolve and load the configuration file.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = Config::load(&path)
            .with_context(|| format!("unable to load config from {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        return Ok((config, Some(path)));
    }

    if let Some(path) = Config::default_path().filter(|p| p.exists()) {
        let config = Config::load(&path)
            .with_context(|| format!("unable to load config from {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        return Ok((config, Some(path)));
    }

    tracing::info!("No config file found, using defaults");
    Ok((Config::default(), None))
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut Config) {
    if let Ok(host) = std::env::var("CROSSPOINT_HOST") {
        config.server.host = host;
    }
    if let Some(port) = std::env::var("CROSSPOINT_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        config.server.port = port;
    }
    if let Ok(ui_dir) = std::env::var("CROSSPOINT_UI_DIR") {
        config.server.ui_dir = ui_dir;
    }
}
