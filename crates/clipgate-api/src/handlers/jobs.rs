//! Upload job status lookup.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use clipgate_core::models::JobState;
use clipgate_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/videos/uploads/{job_id}",
    tag = "uploads",
    params(
        ("job_id" = Uuid, Path, description = "Job ID returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Job state", body = JobState),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(job_id = %job_id, operation = "upload_status"))]
pub async fn upload_status(
    Path(job_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let job = state
        .uploads
        .status(job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Upload job not found: {}", job_id)))?;

    Ok(Json(job))
}
