//! Wire Message Types
//!
//! Defines the JSON messages exchanged with matrix control clients:
//! the inbound command envelope and the outbound state-change events.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Inbound command envelope from a matrix control client.
///
/// `data` is kept raw until `type` is known, so unknown command types can be
/// skipped without attempting to decode their payload.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Command discriminator (e.g. "route_request")
    #[serde(rename = "type")]
    pub kind: String,
    /// Command payload, decoded once `type` selects a schema
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// Request to route a source to a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RouteRequest {
    /// Source (input) number
    pub source: u16,
    /// Destination (output) number
    pub destination: u16,
}

/// Events pushed from the server to matrix control clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MatrixEvent {
    /// A destination's routed source or label changed
    DestinationUpdate(DestinationUpdate),
}

/// State of one destination after a change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationUpdate {
    /// Destination number
    pub id: u16,
    /// Destination label
    pub label: String,
    /// The source currently routed to this destination
    pub source: SourceUpdate,
}

/// Source half of a destination update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceUpdate {
    /// Source number
    pub id: u16,
    /// Source label
    pub label: String,
}
