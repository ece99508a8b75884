//! Upload endpoint - replace the graph with a document

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Serialize;
use tracing::info;

use super::{ApiError, ApiResult};
use crate::api::websocket::state::AppState;
use crate::format::RdfFormat;
use crate::manager::blocking;
use crate::types::RdfGraph;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub triples: usize,
}

/// POST /upload - JSON graph body, or multipart `content` + `format`
///
/// On any decoding error the stored graph is left untouched.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<Json<UploadResponse>> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let graph = if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        decode_multipart(multipart).await?
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        decode_json(&body)?
    };

    let count = blocking(move || {
        let count = state.manager.replace_graph(graph)?;
        state.broadcaster.broadcast_graph();
        Ok(count)
    })
    .await?;

    info!(triples = count, "Graph replaced by upload");
    Ok(Json(UploadResponse {
        success: true,
        triples: count,
    }))
}

fn decode_json(body: &[u8]) -> ApiResult<RdfGraph> {
    let text = std::str::from_utf8(body)
        .map_err(|_| ApiError::bad_request("Upload is not valid UTF-8"))?;
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Upload is empty"));
    }
    Ok(RdfFormat::Json.decode(text)?)
}

async fn decode_multipart(mut multipart: Multipart) -> ApiResult<RdfGraph> {
    let mut content = None;
    let mut format = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_format = field
            .file_name()
            .map(|f| RdfFormat::from_extension(std::path::Path::new(f)));
        let text = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        match name.as_str() {
            "format" => format = Some(RdfFormat::from_name(&text)?),
            "content" | "file" => {
                if format.is_none() {
                    format = file_format;
                }
                content = Some(text);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("Missing 'content' field"))?;
    let format = format.unwrap_or_else(|| guess_format(&content));
    Ok(format.decode(&content)?)
}

fn guess_format(content: &str) -> RdfFormat {
    if content.trim_start().starts_with('{') {
        RdfFormat::Json
    } else {
        RdfFormat::Turtle
    }
}
