//! Chat endpoint

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;

use super::ApiResult;
use crate::api::websocket::state::AppState;
use crate::chat::run_chat;
use crate::error::RdfError;
use crate::types::ChatRequest;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
}

/// POST /chat - `{message, currentGraphData}`
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<ChatResponse>> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(RdfError::from)?;
    info!(chars = request.message.len(), "Chat request");

    let content = run_chat(state.completion.as_ref(), &state.dispatcher, request).await?;
    Ok(Json(ChatResponse { content }))
}
