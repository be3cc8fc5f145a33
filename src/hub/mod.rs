//! Connection Hub
//!
//! Real-time fan-out core of the gateway: the registries of live WebSocket
//! connections and the machinery that pushes router state changes and probe
//! video to them.
//!
//! ## Architecture
//!
//! - **Registry**: mutex-guarded connection set with snapshot iteration
//! - **MatrixHub**: fan-out of JSON state events to control clients
//! - **ProbeHub**: actor-loop hub for binary probe frames, one per channel
//! - **Dispatch**: inbound command envelope decoding and backend routing
//! - **Bridge**: chunked inbound byte streams republished as broadcast frames
//! - **Handler**: WebSocket upgrade endpoints and per-connection tasks
//!
//! Two hub shapes on purpose: the matrix hub's only mutation sites are
//! add/remove/snapshot, so a short-held mutex is enough; the probe hub also
//! makes eviction decisions mid-broadcast, so its membership is owned by a
//! single actor task fed through channels.

pub mod bridge;
pub mod dispatch;
mod handler;
mod matrix;
pub mod messages;
mod probe;
mod registry;

pub use handler::{matrix_ws, probe_ws};
pub use matrix::MatrixHub;
pub use messages::{DestinationUpdate, Envelope, MatrixEvent, RouteRequest, SourceUpdate};
pub use probe::{ProbeHub, DEFAULT_BUFFER_FRAMES};
pub use registry::ConnectionRegistry;
