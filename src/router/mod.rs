//! Router Backend Collaborator
//!
//! Everything the gateway knows about the matrix router it fronts:
//!
//! - **Matrix**: the in-memory crosspoint state (sources, destinations,
//!   labels, current routing)
//! - **Backend**: the [`RouterBackend`] trait the hub dispatches to, and the
//!   in-process [`MatrixRouter`] implementation
//! - **Labels**: panel label file loading
//!
//! The router's own wire protocol is out of scope here; a device driver
//! lives behind [`RouterBackend`] in its own crate or module.

mod backend;
pub mod labels;
mod matrix;

pub use backend::{MatrixRouter, RouterBackend, RouterError};
pub use labels::LabelSet;
pub use matrix::{Destination, Matrix, Source};
