//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clipgate_core::{AppError, ErrorMetadata, LogLevel};
use clipgate_stream::StreamError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Resubmit the upload")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from clipgate-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Classify a backend client error into the application taxonomy. Transport
/// detail has already been logged at the client layer; each distinct failure
/// kind keeps its own variant instead of collapsing into one generic error.
pub fn classify_stream_error(err: StreamError) -> AppError {
    match err {
        StreamError::VideoCreationFailed(msg) => AppError::VideoCreationFailed(msg),
        StreamError::VideoNotFound(id) => AppError::NotFound(format!("Video not found: {}", id)),
        StreamError::VideoFetchFailed(msg) => AppError::VideoFetchFailed(msg),
        StreamError::UploadSessionFailed(msg) => AppError::UploadTransport(msg),
        StreamError::UploadTransportFailed(msg) => AppError::UploadTransport(msg),
        StreamError::UploadAuthorizationExpired(msg) => {
            AppError::UploadAuthorizationExpired(msg)
        }
        StreamError::UploadFinalizeFailed(msg) => AppError::UploadFinalizeFailed(msg),
        StreamError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        StreamError::ConfigError(msg) => AppError::Internal(msg),
    }
}

impl From<StreamError> for HttpAppError {
    fn from(err: StreamError) -> Self {
        HttpAppError(classify_stream_error(err))
    }
}

/// Helper function to log errors based on their log level
fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Helper function to check if we're in production environment
fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        // Get HTTP status code from error metadata
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Log based on error severity
        log_error(app_error);

        // Always hide details in production; otherwise only for non-sensitive
        // errors. Error codes and suggested actions are always safe to return.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}
