//! Video metadata retrieval (passthrough to the backend collection).

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use clipgate_core::models::RemoteVideo;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Backend video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = RemoteVideo),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .registrar
        .get_video(&id)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(video))
}
