//! WebSocket event types for graph synchronization

use serde::{Deserialize, Serialize};

use crate::types::{Triple, VisualizationData};

/// Events pushed to viewers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full node/edge projection of the graph
    GraphData(VisualizationData),

    /// Prefix tokens and namespace hints
    Prefixes(Vec<String>),

    /// Something went wrong handling a request or a broadcast
    Error(String),

    /// Heartbeat answer
    Pong,
}

/// WebSocket message wrapper with metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsMessage {
    #[serde(flatten)]
    pub event: ServerEvent,

    /// Monotonically increasing sequence ID for gap detection
    pub sequence_id: u64,

    /// Unix timestamp when the message was created
    pub timestamp: i64,
}

/// Messages sent by viewers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask for the current projection
    RequestGraph,

    /// Add one triple and broadcast the result
    AddTriple(Triple),

    /// Drop every triple and broadcast the result
    ClearGraph,

    /// Heartbeat
    Ping,
}
