//! Signed playback and thumbnail link handlers.
//!
//! Link signing is synchronous and fails loudly: the caller consumes the
//! URL inline, so errors propagate as HTTP error responses.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Path, State};
use clipgate_core::AppError;
use std::sync::Arc;

/// A video id appears in the signed path scope; reject anything that could
/// widen the scope or break out of the path segment.
fn validate_segment(value: &str, what: &str) -> Result<(), HttpAppError> {
    let ok = !value.is_empty()
        && !value.contains("..")
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if ok {
        Ok(())
    } else {
        Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Invalid {}: '{}'",
            what, value
        ))))
    }
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/link",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Backend video ID")
    ),
    responses(
        (status = 200, description = "Signed playback URL", body = String),
        (status = 400, description = "Invalid video ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "video_link"))]
pub async fn video_link(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<String, HttpAppError> {
    validate_segment(&id, "video ID")?;

    let allowed_path = format!("/{}/", id);
    let resource_url = format!(
        "https://{}/{}/playlist.m3u8",
        state.config.signing.cdn_hostname, id
    );
    let signed = state.signer.sign_url(&resource_url, &allowed_path);

    tracing::debug!(expires = signed.expires, "Signed playback URL issued");
    Ok(signed.url)
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/thumbnails/{file}/link",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Backend video ID"),
        ("file" = String, Path, description = "Thumbnail file name")
    ),
    responses(
        (status = 200, description = "Signed thumbnail URL", body = String),
        (status = 400, description = "Invalid video ID or file name", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, thumbnail = %file, operation = "thumbnail_link"))]
pub async fn thumbnail_link(
    Path((id, file)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<String, HttpAppError> {
    validate_segment(&id, "video ID")?;
    validate_segment(&file, "thumbnail file name")?;

    // Thumbnails share the video's path scope, so one token covers both.
    let allowed_path = format!("/{}/", id);
    let resource_url = format!(
        "https://{}/{}/{}",
        state.config.signing.cdn_hostname, id, file
    );
    let signed = state.signer.sign_url(&resource_url, &allowed_path);

    Ok(signed.url)
}
