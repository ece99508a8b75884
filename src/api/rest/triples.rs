//! Triple endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::api::websocket::state::AppState;
use crate::error::RdfError;
use crate::manager::blocking;
use crate::types::{RdfGraph, Triple, TriplePattern};

#[derive(Debug, Serialize)]
pub struct AddTripleResponse {
    pub success: bool,
    pub added: bool,
}

/// POST /addTriple - add one triple and broadcast the new projection
pub async fn add_triple(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<AddTripleResponse>> {
    let triple: Triple = serde_json::from_slice(&body).map_err(RdfError::from)?;
    let added = blocking(move || {
        let added = !state.manager.add_triples(vec![triple])?.is_empty();
        if added {
            state.broadcaster.broadcast_graph();
        }
        Ok(added)
    })
    .await?;

    Ok(Json(AddTripleResponse {
        success: true,
        added,
    }))
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub triples: Vec<Triple>,
    pub count: usize,
}

/// GET /api/triples - triples matching the query-string pattern
pub async fn query_triples(
    State(state): State<Arc<AppState>>,
    Query(pattern): Query<TriplePattern>,
) -> ApiResult<Json<QueryResponse>> {
    let triples = blocking(move || state.manager.query_triples(&pattern)).await?;
    Ok(Json(QueryResponse {
        count: triples.len(),
        triples,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphParams {
    /// Shorten IRIs through the prefix table
    #[serde(default)]
    pub shortened: bool,
}

/// GET /api/graph - full graph snapshot
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> ApiResult<Json<RdfGraph>> {
    let graph = blocking(move || {
        if params.shortened {
            state.manager.display_graph()
        } else {
            state.manager.read_graph()
        }
    })
    .await?;
    Ok(Json(graph))
}
