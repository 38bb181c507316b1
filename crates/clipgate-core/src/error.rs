//! Error types module
//!
//! This module provides the core error types used throughout the Clipgate
//! application. All errors are unified under the `AppError` enum, which
//! covers token signing, remote video registration, resumable upload
//! transport, and the usual HTTP-facing request errors.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a full upload queue
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VIDEO_CREATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Signing input invalid: {0}")]
    SigningInput(String),

    #[error("Video creation failed: {0}")]
    VideoCreationFailed(String),

    #[error("Video fetch failed: {0}")]
    VideoFetchFailed(String),

    #[error("Upload transport failed: {0}")]
    UploadTransport(String),

    #[error("Upload authorization expired: {0}")]
    UploadAuthorizationExpired(String),

    #[error("Upload finalize failed: {0}")]
    UploadFinalizeFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upload queue full: {0}")]
    QueueFull(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations following Rust best practices
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::SigningInput(_) => (
            500,
            "SIGNING_INPUT_INVALID",
            false,
            Some("Check token signing configuration"),
            true,
            LogLevel::Error,
        ),
        AppError::VideoCreationFailed(_) => (
            502,
            "VIDEO_CREATION_FAILED",
            true,
            Some("Resubmit the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::VideoFetchFailed(_) => (
            502,
            "VIDEO_FETCH_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::UploadTransport(_) => (
            502,
            "UPLOAD_TRANSPORT_FAILED",
            true,
            Some("Resubmit the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::UploadAuthorizationExpired(_) => (
            502,
            "UPLOAD_AUTHORIZATION_EXPIRED",
            true,
            Some("Resubmit the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::UploadFinalizeFailed(_) => (
            502,
            "UPLOAD_FINALIZE_FAILED",
            false,
            Some("Resubmit the upload and verify the result"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::QueueFull(_) => (
            503,
            "UPLOAD_QUEUE_FULL",
            true,
            Some("Wait a short delay and resubmit"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::SigningInput(_) => "SigningInput",
            AppError::VideoCreationFailed(_) => "VideoCreationFailed",
            AppError::VideoFetchFailed(_) => "VideoFetchFailed",
            AppError::UploadTransport(_) => "UploadTransport",
            AppError::UploadAuthorizationExpired(_) => "UploadAuthorizationExpired",
            AppError::UploadFinalizeFailed(_) => "UploadFinalizeFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::QueueFull(_) => "QueueFull",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::SigningInput(_) => "Failed to sign URL".to_string(),
            AppError::VideoCreationFailed(_) => "Failed to register video".to_string(),
            AppError::VideoFetchFailed(_) => "Failed to fetch video".to_string(),
            AppError::UploadTransport(_) => "Failed to transfer video".to_string(),
            AppError::UploadAuthorizationExpired(_) => {
                "Upload authorization expired".to_string()
            }
            AppError::UploadFinalizeFailed(_) => "Failed to finalize upload".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::QueueFull(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
