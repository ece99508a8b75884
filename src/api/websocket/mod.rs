//! WebSocket module for real-time viewer updates
//!
//! Provides the `/ws` endpoint. Every viewer receives the full graph
//! projection on connect and again after each mutation.
//!
//! ## Features
//! - Full-projection broadcast after every mutation
//! - Sequence ID tracking for gap detection
//! - Lagging viewers get a fresh snapshot instead of the backlog

pub mod broadcaster;
pub mod events;
pub mod handler;
pub mod state;

pub use broadcaster::GraphBroadcaster;
pub use events::{ClientMessage, ServerEvent, WsMessage};
pub use state::AppState;
