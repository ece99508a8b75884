//! Prefix table endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::api::websocket::state::AppState;
use crate::error::RdfError;
use crate::manager::{blocking, PrefixChange};

#[derive(Debug, Serialize)]
pub struct PrefixesResponse {
    pub prefixes: BTreeMap<String, String>,
}

/// GET /api/prefixes
pub async fn list_prefixes(State(state): State<Arc<AppState>>) -> ApiResult<Json<PrefixesResponse>> {
    Ok(Json(PrefixesResponse {
        prefixes: blocking(move || state.manager.prefixes()).await?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddPrefixRequest {
    pub prefix: String,
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct PrefixChangeResponse {
    pub success: bool,
    pub change: &'static str,
}

/// POST /api/prefixes - `{prefix, uri}`
pub async fn add_prefix(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<PrefixChangeResponse>> {
    let request: AddPrefixRequest = serde_json::from_slice(&body).map_err(RdfError::from)?;
    let change = blocking(move || {
        let change = state.manager.add_prefix(&request.prefix, &request.uri)?;
        if change != PrefixChange::Unchanged {
            state.broadcaster.broadcast_prefixes();
        }
        Ok(change)
    })
    .await?;

    Ok(Json(PrefixChangeResponse {
        success: true,
        change: match change {
            PrefixChange::Added => "added",
            PrefixChange::Updated => "updated",
            PrefixChange::Unchanged => "unchanged",
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct DeletePrefixResponse {
    pub success: bool,
    pub deleted: bool,
}

/// DELETE /api/prefixes/:prefix
pub async fn delete_prefix(
    State(state): State<Arc<AppState>>,
    Path(prefix): Path<String>,
) -> ApiResult<Json<DeletePrefixResponse>> {
    let deleted = blocking(move || {
        let deleted = state.manager.delete_prefix(&prefix)?;
        if deleted {
            state.broadcaster.broadcast_prefixes();
        }
        Ok(deleted)
    })
    .await?;
    Ok(Json(DeletePrefixResponse {
        success: true,
        deleted,
    }))
}
