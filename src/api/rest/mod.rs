//! REST API module for HTTP endpoints
//!
//! - `POST /upload` - Replace the graph with an uploaded document
//! - `POST /addTriple` - Add one triple
//! - `GET /download` - Serialize the graph as a file attachment
//! - `POST /chat` - Chat with tool calling over the graph
//! - `GET /api/graph` - Graph snapshot, optionally with shortened IRIs
//! - `GET /api/triples` - Pattern query
//! - `GET|POST|DELETE /api/prefixes` - Prefix table

pub mod chat;
pub mod download;
pub mod prefixes;
pub mod triples;
pub mod upload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::RdfError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.to_string(),
            status,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<RdfError> for ApiError {
    fn from(err: RdfError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            error!(error = %err, "Request failed");
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
