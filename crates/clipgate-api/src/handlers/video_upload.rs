//! Video upload handler.
//!
//! Materializes the multipart `video` field to a temporary file and hands it
//! to the job queue. The response only acknowledges acceptance; the job's
//! outcome is observable through the status endpoint.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Field, Multipart},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use clipgate_core::models::{JobStatus, UploadAccepted};
use clipgate_core::AppError;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/videos/upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Upload accepted, job id returned", body = UploadAccepted),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 503, description = "Upload queue full", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut stored: Option<(NamedTempFile, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(HttpAppError::from(AppError::BadRequest(format!(
                    "Failed to read multipart: {}",
                    e
                ))));
            }
        };

        if field.name() != Some("video") {
            continue;
        }

        let original_filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload.mp4".to_string());
        let file_name = sanitize_file_name(&original_filename);

        let file =
            materialize_field(field, state.config.upload.max_video_size_bytes).await?;
        stored = Some((file, file_name));
        break;
    }

    let (file, file_name) = stored.ok_or_else(|| {
        HttpAppError::from(AppError::BadRequest("No video field provided".to_string()))
    })?;

    let job_id = state
        .uploads
        .submit(file, file_name)
        .await
        .map_err(HttpAppError::from)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAccepted {
            job_id,
            status: JobStatus::Queued,
            message: "Video upload is in progress".to_string(),
        }),
    ))
}

/// Stream the multipart field to a temporary file, enforcing the size limit
/// without buffering the whole upload in memory.
async fn materialize_field(
    mut field: Field<'_>,
    max_size_bytes: usize,
) -> Result<NamedTempFile, HttpAppError> {
    let temp = NamedTempFile::new().map_err(|e| {
        AppError::Internal(format!("Failed to create temporary file: {}", e))
    })?;
    let std_file = temp
        .reopen()
        .map_err(|e| AppError::Internal(format!("Failed to open temporary file: {}", e)))?;
    let mut file = tokio::fs::File::from_std(std_file);

    let mut written: usize = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                return Err(HttpAppError::from(AppError::BadRequest(format!(
                    "Failed to read file data: {}",
                    e
                ))));
            }
        };

        written += chunk.len();
        if written > max_size_bytes {
            return Err(HttpAppError::from(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max_size_bytes / 1024 / 1024
            ))));
        }

        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;
    }

    if written == 0 {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "File is empty".to_string(),
        )));
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush upload: {}", e)))?;

    Ok(temp)
}

/// Keep only filesystem- and metadata-safe characters; fall back to a
/// generated name when nothing usable remains.
fn sanitize_file_name(original: &str) -> String {
    let extension: String = original
        .rsplit('.')
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let extension = if extension.is_empty() {
        "mp4".to_string()
    } else {
        extension
    };

    let safe: String = original
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .collect();

    if safe.trim().is_empty() || safe.len() < 3 || safe == format!(".{}", extension) {
        format!("{}.{}", Uuid::new_v4(), extension)
    } else {
        safe
    }
}
