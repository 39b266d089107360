//! Feed event model.
//!
//! The feed pushes per-node connectivity events as JSON text frames. This
//! is deliberately the thinnest possible wire model: one subscribe frame
//! per chain on connect, then heartbeat/disconnect events keyed by node
//! name. Frames that do not decode are ignored with a debug log.

use serde::{Deserialize, Serialize};

/// A per-node connectivity event from the telemetry feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// The node produced a heartbeat; it is connected.
    Heartbeat { node: String },
    /// The feed lost the node's connection.
    Disconnected { node: String },
}

impl FeedEvent {
    pub fn node(&self) -> &str {
        match self {
            FeedEvent::Heartbeat { node } | FeedEvent::Disconnected { node } => node,
        }
    }
}
