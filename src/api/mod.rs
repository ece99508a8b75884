//! API module for HTTP and WebSocket endpoints
//!
//! REST handlers, the viewer WebSocket and the node/edge projection they
//! share.

pub mod http;
pub mod projection;
pub mod rest;
pub mod websocket;
