//! Backend client abstraction traits
//!
//! This module defines the traits the upload orchestrator depends on, so the
//! real HTTP clients can be swapped for mocks in tests.

use async_trait::async_trait;
use clipgate_core::models::RemoteVideo;
use std::path::Path;
use thiserror::Error;

/// Backend client operation errors
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Video creation failed: {0}")]
    VideoCreationFailed(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Video fetch failed: {0}")]
    VideoFetchFailed(String),

    #[error("Upload session failed: {0}")]
    UploadSessionFailed(String),

    #[error("Upload transport failed: {0}")]
    UploadTransportFailed(String),

    #[error("Upload authorization expired: {0}")]
    UploadAuthorizationExpired(String),

    #[error("Upload finalize failed: {0}")]
    UploadFinalizeFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StreamError {
    /// Whether retrying the same operation can succeed without operator
    /// intervention. Transport interruptions resume from the acknowledged
    /// offset; an expired authorization needs a fresh signature first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::UploadTransportFailed(_) | StreamError::UploadAuthorizationExpired(_)
        )
    }
}

/// Result type for backend client operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Registers video entities on the streaming backend.
#[async_trait]
pub trait VideoRegistrar: Send + Sync {
    /// Create a video entity named after the uploaded file. On success the
    /// returned entity always carries a non-empty `guid`.
    async fn create_video(&self, title: &str) -> StreamResult<RemoteVideo>;

    /// Fetch a video entity by its backend id.
    async fn get_video(&self, video_id: &str) -> StreamResult<RemoteVideo>;
}

/// Transfers local files to the streaming backend's upload endpoint.
#[async_trait]
pub trait VideoUploader: Send + Sync {
    /// Upload the file at `file_path` to the video entity `video_id`,
    /// titled `title`. Returns only once the backend has acknowledged the
    /// complete file.
    async fn upload(&self, file_path: &Path, title: &str, video_id: &str) -> StreamResult<()>;
}
