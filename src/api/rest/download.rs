//! Download endpoint - serialize the graph as an attachment

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::IntoResponse,
};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::api::websocket::state::AppState;
use crate::format::RdfFormat;
use crate::manager::blocking;

const DEFAULT_FILENAME: &str = "graph";

#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    pub format: Option<String>,
    pub filename: Option<String>,
}

/// GET /download?format=&filename=
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<impl IntoResponse> {
    let format = match params.format.as_deref() {
        Some(name) => RdfFormat::from_name(name)?,
        None => RdfFormat::Turtle,
    };
    let body = blocking(move || state.manager.export(format)).await?;

    let file_name = attachment_name(params.filename.as_deref(), format);
    let disposition = HeaderValue::from_str(&content_disposition(&file_name))
        .map_err(|_| ApiError::bad_request("Invalid filename"))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.media_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// `name.ext`, keeping an extension the caller already supplied
fn attachment_name(requested: Option<&str>, format: RdfFormat) -> String {
    let base = requested
        .map(|n| n.rsplit(['/', '\\']).next().unwrap_or_default().trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_FILENAME);

    let ext = format.file_extension();
    if base.ends_with(&format!(".{}", ext)) {
        base.to_string()
    } else {
        format!("{}.{}", base, ext)
    }
}

fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && !matches!(c, '"' | '\\'))
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}
