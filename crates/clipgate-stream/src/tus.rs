//! Resumable upload client (tus 1.0.0).
//!
//! Uploads a local file to the backend's upload endpoint in acknowledged
//! chunks. Sessions are created with a short-lived authorization signature
//! scoped to one video id; every chunk PATCH carries the same headers. An
//! interrupted transfer resumes from the offset the server last
//! acknowledged, never from zero, and a session can also be re-entered
//! later by its URL via [`TusUploadClient::resume`].

use crate::traits::{StreamError, StreamResult, VideoUploader};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use clipgate_core::config::{SigningConfig, StreamConfig};
use clipgate_core::UploadAuthorization;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

const TUS_VERSION: &str = "1.0.0";

/// In-session retries for an interrupted chunk before the transfer is
/// abandoned. Each retry re-reads the server offset and continues the same
/// session.
const MAX_CHUNK_RETRIES: u32 = 3;

/// An open upload session on the backend.
#[derive(Debug, Clone)]
pub struct UploadSession {
    /// Session URL from the creation response's `Location` header.
    pub upload_url: String,
    /// Last offset the server acknowledged.
    pub offset: u64,
    /// Total upload length in bytes.
    pub length: u64,
}

/// Resumable upload client for the streaming backend.
#[derive(Clone)]
pub struct TusUploadClient {
    client: Client,
    creation_url: String,
    library_id: String,
    api_key: String,
    auth_validity_secs: u64,
    chunk_size: usize,
}

impl TusUploadClient {
    pub fn new(
        stream: &StreamConfig,
        signing: &SigningConfig,
        chunk_size_bytes: usize,
    ) -> StreamResult<Self> {
        if chunk_size_bytes == 0 {
            return Err(StreamError::ConfigError(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(stream.request_timeout_secs))
            .build()
            .map_err(|e| StreamError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            creation_url: stream.tus_upload_url.clone(),
            library_id: stream.library_id.clone(),
            api_key: stream.api_key.clone(),
            auth_validity_secs: signing.upload_auth_validity_secs,
            chunk_size: chunk_size_bytes,
        })
    }

    /// Derive a fresh authorization for `video_id`. Called per attempt;
    /// signatures are never reused once an attempt failed on authorization.
    fn authorization(&self, video_id: &str) -> UploadAuthorization {
        UploadAuthorization::issue(
            &self.library_id,
            &self.api_key,
            video_id,
            self.auth_validity_secs,
        )
    }

    fn with_tus_headers(
        request: RequestBuilder,
        auth: &UploadAuthorization,
    ) -> RequestBuilder {
        request
            .header("Tus-Resumable", TUS_VERSION)
            .header("AuthorizationSignature", &auth.signature)
            .header("AuthorizationExpire", auth.expires.to_string())
            .header("VideoId", &auth.video_id)
            .header("LibraryId", &auth.library_id)
    }

    fn header_u64(response: &Response, name: &str) -> Option<u64> {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
    }

    /// `Upload-Metadata` value: comma-separated `key base64(value)` pairs.
    fn encode_metadata(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(key, value)| format!("{} {}", key, BASE64_STANDARD.encode(value)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Open a new upload session for `length` bytes.
    async fn create_session(
        &self,
        auth: &UploadAuthorization,
        length: u64,
        title: &str,
        content_type: &str,
    ) -> StreamResult<UploadSession> {
        let metadata = Self::encode_metadata(&[("filetype", content_type), ("title", title)]);
        let request = self
            .client
            .post(&self.creation_url)
            .header("Upload-Length", length.to_string())
            .header("Upload-Metadata", metadata);

        let response = Self::with_tus_headers(request, auth).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %self.creation_url, "Upload session request failed to send");
            StreamError::UploadSessionFailed("backend unreachable".to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StreamError::UploadAuthorizationExpired(format!(
                "session creation rejected with status {}",
                status
            )));
        }
        if !status.is_success() {
            tracing::error!(status = %status, video_id = %auth.video_id, "Upload session creation rejected");
            return Err(StreamError::UploadSessionFailed(format!(
                "backend returned status {}",
                status
            )));
        }

        let location = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                StreamError::UploadSessionFailed("missing Location header".to_string())
            })?;

        // The Location header may be relative to the creation endpoint.
        let upload_url = url::Url::parse(&self.creation_url)
            .and_then(|base| base.join(location))
            .map_err(|e| {
                StreamError::UploadSessionFailed(format!("invalid session URL: {}", e))
            })?
            .to_string();

        tracing::debug!(video_id = %auth.video_id, upload_url = %upload_url, length, "Upload session created");
        Ok(UploadSession {
            upload_url,
            offset: 0,
            length,
        })
    }

    /// Ask the server for the last acknowledged offset of a session.
    async fn probe_offset(
        &self,
        upload_url: &str,
        auth: &UploadAuthorization,
    ) -> StreamResult<u64> {
        let request = self.client.head(upload_url);
        let response = Self::with_tus_headers(request, auth).send().await.map_err(|e| {
            StreamError::UploadTransportFailed(format!("offset probe failed: {}", e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StreamError::UploadAuthorizationExpired(format!(
                "offset probe rejected with status {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(StreamError::UploadTransportFailed(format!(
                "offset probe returned status {}",
                status
            )));
        }

        Self::header_u64(&response, "Upload-Offset").ok_or_else(|| {
            StreamError::UploadTransportFailed("offset probe missing Upload-Offset".to_string())
        })
    }

    /// PATCH one chunk at `offset`; returns the offset the server now
    /// acknowledges.
    async fn send_chunk(
        &self,
        upload_url: &str,
        auth: &UploadAuthorization,
        offset: u64,
        data: Vec<u8>,
    ) -> StreamResult<u64> {
        let request = self
            .client
            .patch(upload_url)
            .header("Upload-Offset", offset.to_string())
            .header("Content-Type", "application/offset+octet-stream")
            .body(data);

        let response = Self::with_tus_headers(request, auth).send().await.map_err(|e| {
            StreamError::UploadTransportFailed(format!("chunk transfer failed: {}", e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StreamError::UploadAuthorizationExpired(format!(
                "chunk rejected with status {}",
                status
            )));
        }
        if !status.is_success() {
            // Includes 409 offset conflicts; the caller re-probes and resumes.
            return Err(StreamError::UploadTransportFailed(format!(
                "chunk returned status {}",
                status
            )));
        }

        Self::header_u64(&response, "Upload-Offset").ok_or_else(|| {
            StreamError::UploadTransportFailed("chunk response missing Upload-Offset".to_string())
        })
    }

    /// Confirm the server acknowledged the complete upload.
    async fn finalize(
        &self,
        session: &UploadSession,
        auth: &UploadAuthorization,
    ) -> StreamResult<()> {
        let offset = self
            .probe_offset(&session.upload_url, auth)
            .await
            .map_err(|e| StreamError::UploadFinalizeFailed(e.to_string()))?;

        if offset != session.length {
            return Err(StreamError::UploadFinalizeFailed(format!(
                "server acknowledged {} of {} bytes",
                offset, session.length
            )));
        }

        tracing::info!(
            video_id = %auth.video_id,
            bytes = session.length,
            "Upload finalized"
        );
        Ok(())
    }

    /// Send chunks from the session's current offset until the file is
    /// exhausted, then finalize.
    async fn transfer(
        &self,
        file_path: &Path,
        mut session: UploadSession,
        mut auth: UploadAuthorization,
        video_id: &str,
    ) -> StreamResult<()> {
        let mut file = File::open(file_path).await?;
        let mut retries = 0u32;
        let mut auth_refreshed = false;

        while session.offset < session.length {
            file.seek(SeekFrom::Start(session.offset)).await?;
            let want = self
                .chunk_size
                .min((session.length - session.offset) as usize);
            let mut chunk = vec![0u8; want];
            file.read_exact(&mut chunk).await?;

            match self
                .send_chunk(&session.upload_url, &auth, session.offset, chunk)
                .await
            {
                Ok(acknowledged) => {
                    session.offset = acknowledged;
                    retries = 0;
                }
                Err(StreamError::UploadAuthorizationExpired(msg)) => {
                    // A signature is time-boxed; derive a fresh one with a
                    // new expiration before retrying. One refresh per
                    // transfer, a second rejection means the key is wrong.
                    if auth_refreshed {
                        return Err(StreamError::UploadAuthorizationExpired(msg));
                    }
                    tracing::warn!(video_id = %video_id, "Upload authorization expired mid-transfer, refreshing");
                    auth = self.authorization(video_id);
                    auth_refreshed = true;
                }
                Err(StreamError::UploadTransportFailed(msg)) => {
                    retries += 1;
                    if retries > MAX_CHUNK_RETRIES {
                        return Err(StreamError::UploadTransportFailed(msg));
                    }
                    tracing::warn!(
                        video_id = %video_id,
                        retry = retries,
                        error = %msg,
                        "Chunk transfer interrupted, resuming from server offset"
                    );
                    session.offset = self.probe_offset(&session.upload_url, &auth).await?;
                }
                Err(e) => return Err(e),
            }
        }

        self.finalize(&session, &auth).await
    }

    /// Resume an existing upload session by its URL, continuing from the
    /// last offset the server acknowledged.
    pub async fn resume(
        &self,
        session_url: &str,
        file_path: &Path,
        video_id: &str,
    ) -> StreamResult<()> {
        let length = tokio::fs::metadata(file_path).await?.len();
        let auth = self.authorization(video_id);
        let offset = self.probe_offset(session_url, &auth).await?;
        let session = UploadSession {
            upload_url: session_url.to_string(),
            offset,
            length,
        };
        tracing::info!(video_id = %video_id, offset, length, "Resuming upload session");
        self.transfer(file_path, session, auth, video_id).await
    }
}

/// Content type for the upload metadata, from the title's extension.
fn content_type_for(title: &str) -> &'static str {
    match title.rsplit('.').next().map(|ext| ext.to_lowercase()) {
        Some(ext) if ext == "webm" => "video/webm",
        Some(ext) if ext == "mov" => "video/quicktime",
        Some(ext) if ext == "mkv" => "video/x-matroska",
        Some(ext) if ext == "avi" => "video/x-msvideo",
        _ => "video/mp4",
    }
}

#[async_trait]
impl VideoUploader for TusUploadClient {
    async fn upload(&self, file_path: &Path, title: &str, video_id: &str) -> StreamResult<()> {
        let length = tokio::fs::metadata(file_path).await?.len();
        let content_type = content_type_for(title);

        let mut auth = self.authorization(video_id);
        let session = match self
            .create_session(&auth, length, title, content_type)
            .await
        {
            Err(StreamError::UploadAuthorizationExpired(_)) => {
                tracing::warn!(video_id = %video_id, "Upload authorization rejected at session creation, refreshing");
                auth = self.authorization(video_id);
                self.create_session(&auth, length, title, content_type)
                    .await?
            }
            other => other?,
        };

        self.transfer(file_path, session, auth, video_id).await
    }
}
