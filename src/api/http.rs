//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    response::Html,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::rest::{chat, download, prefixes, triples, upload, ApiError};
use super::websocket::{handler::ws_handler, state::AppState};

const INDEX_HTML: &str = include_str!("index.html");

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.config.assets_dir);

    Router::new()
        .route("/", get(index))
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // Viewer endpoints
        .route("/upload", post(upload::upload))
        .route("/addTriple", post(triples::add_triple))
        .route("/download", get(download::download))
        .route("/chat", post(chat::chat))
        // REST API endpoints
        .route("/api/graph", get(triples::get_graph))
        .route("/api/triples", get(triples::query_triples))
        .route(
            "/api/prefixes",
            get(prefixes::list_prefixes).post(prefixes::add_prefix),
        )
        .route("/api/prefixes/:prefix", delete(prefixes::delete_prefix))
        .nest_service("/src", assets)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
