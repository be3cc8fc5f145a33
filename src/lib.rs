//! # Crosspoint
//!
//! A web control gateway for broadcast matrix routers. Crosspoint fronts a
//! crosspoint router with an HTTP/WebSocket surface: control clients see
//! routing changes the moment they happen, operators punch routes from the
//! browser, and probe channels stream confidence video to any number of
//! viewers.
//!
//! ## Modules
//!
//! - [`hub`]: Connection registries, fan-out broadcast, command dispatch,
//!   and the stream-to-frame bridge
//! - [`router`]: The matrix state model and the backend driver seam
//! - [`api`]: HTTP/WebSocket server with Axum
//! - [`config`]: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crosspoint::api::{serve, AppState};
//! use crosspoint::config::Config;
//! use crosspoint::router::{Matrix, MatrixRouter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let server = config.server.clone();
//!
//!     let router = Arc::new(MatrixRouter::new(Matrix::new(
//!         config.router.inputs,
//!         config.router.outputs,
//!     )));
//!
//!     let state = AppState::new(router, config, None);
//!     serve(state, &server).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod hub;
pub mod router;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use config::{Config, ConfigError, ProbeChannelConfig, RouterConfig, ServerConfig};

pub use hub::{
    DestinationUpdate, Envelope, MatrixEvent, MatrixHub, ProbeHub, RouteRequest, SourceUpdate,
};

pub use router::{Destination, LabelSet, Matrix, MatrixRouter, RouterBackend, RouterError, Source};
