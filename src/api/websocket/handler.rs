//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};

use super::events::{ClientMessage, ServerEvent, WsMessage};
use super::state::AppState;
use crate::manager::blocking;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            error!(error = %e, "Failed to encode WebSocket message");
            true
        }
    }
}

/// Handle an individual viewer connection
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before the snapshot so no broadcast falls in between
    let mut rx = state.subscribe();
    debug!("Viewer connected");

    let initial = {
        let state = Arc::clone(&state);
        blocking(move || Ok(state.broadcaster.initial_messages())).await
    };
    let initial = match initial {
        Ok(messages) => messages,
        Err(e) => {
            error!(error = %e, "Failed to prepare initial messages");
            return;
        }
    };

    for msg in initial {
        if !send(&mut socket, &msg).await {
            return; // Client disconnected immediately
        }
    }

    loop {
        tokio::select! {
            // Broadcast projections to the viewer
            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if !send(&mut socket, &msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        // Too slow: skip the backlog and resend the whole graph
                        warn!(missed = n, "Viewer lagged, resending graph");
                        let msg = state.broadcaster.snapshot().unwrap_or_else(|e| {
                            state.broadcaster.message(ServerEvent::Error(e.to_string()))
                        });
                        if !send(&mut socket, &msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Handle viewer messages
            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_frame(msg, &state, &mut socket).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    debug!("Viewer disconnected");
}

/// Handle one frame; returns false when the connection should close
async fn handle_frame(msg: Message, state: &Arc<AppState>, socket: &mut WebSocket) -> bool {
    match msg {
        Message::Text(text) => {
            let state = Arc::clone(state);
            match blocking(move || Ok(handle_client_text(&text, &state))).await {
                Ok(Some(reply)) => send(socket, &reply).await,
                Ok(None) => true,
                Err(e) => {
                    error!(error = %e, "Viewer message handling failed");
                    true
                }
            }
        }
        Message::Binary(_) => true,
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true,
        Message::Close(_) => false,
    }
}

/// Apply a viewer message; the returned message goes to that viewer only.
///
/// Mutations are broadcast to every viewer, the sender included.
pub fn handle_client_text(text: &str, state: &AppState) -> Option<WsMessage> {
    let reply = |event| Some(state.broadcaster.message(event));

    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(error = %e, "Unparseable viewer message");
            return reply(ServerEvent::Error(format!("Invalid message: {}", e)));
        }
    };

    match client_msg {
        ClientMessage::RequestGraph => match state.broadcaster.snapshot() {
            Ok(msg) => Some(msg),
            Err(e) => {
                error!(error = %e, "Failed to load graph for viewer");
                reply(ServerEvent::Error("Failed to load graph".to_string()))
            }
        },
        ClientMessage::AddTriple(triple) => match state.manager.add_triples(vec![triple]) {
            Ok(_) => {
                state.broadcaster.broadcast_graph();
                None
            }
            Err(e) => {
                warn!(error = %e, "Viewer triple rejected");
                reply(ServerEvent::Error(format!("Failed to add triple: {}", e)))
            }
        },
        ClientMessage::ClearGraph => match state.manager.clear() {
            Ok(removed) => {
                debug!(removed, "Graph cleared by viewer");
                state.broadcaster.broadcast_graph();
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to clear graph");
                reply(ServerEvent::Error(format!("Failed to clear graph: {}", e)))
            }
        },
        ClientMessage::Ping => reply(ServerEvent::Pong),
    }
}
