//! HTTP client for the streaming backend's video collection.
//!
//! One client instance per process; registration is a single POST and
//! retrieval a single GET, both authenticated with the `AccessKey` header.
//! Transport-level failure detail stays in the logs; callers only see the
//! classified [`StreamError`] variants.

use crate::traits::{StreamError, StreamResult, VideoRegistrar};
use async_trait::async_trait;
use clipgate_core::config::StreamConfig;
use clipgate_core::models::{CreateVideoRequest, RemoteVideo};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// HTTP client for video registration and retrieval.
#[derive(Clone)]
pub struct StreamApiClient {
    client: Client,
    api_base_url: String,
    library_id: String,
    api_key: String,
}

impl StreamApiClient {
    pub fn new(config: &StreamConfig) -> StreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StreamError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            library_id: config.library_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}/videos", self.api_base_url, self.library_id)
    }

    fn video_url(&self, video_id: &str) -> String {
        format!("{}/{}", self.collection_url(), video_id)
    }
}

#[async_trait]
impl VideoRegistrar for StreamApiClient {
    async fn create_video(&self, title: &str) -> StreamResult<RemoteVideo> {
        let url = self.collection_url();
        let response = self
            .client
            .post(&url)
            .header("AccessKey", &self.api_key)
            .json(&CreateVideoRequest::new(title))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "Video creation request failed to send");
                StreamError::VideoCreationFailed("backend unreachable".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                title = %title,
                "Backend rejected video creation"
            );
            return Err(StreamError::VideoCreationFailed(format!(
                "backend returned status {}",
                status
            )));
        }

        let video: RemoteVideo = response.json().await.map_err(|e| {
            tracing::error!(error = %e, title = %title, "Video creation response unparsable");
            StreamError::VideoCreationFailed("unparsable backend response".to_string())
        })?;

        if video.guid.trim().is_empty() {
            return Err(StreamError::VideoCreationFailed(
                "backend returned an empty video id".to_string(),
            ));
        }

        tracing::info!(video_id = %video.guid, title = %title, "Video registered on backend");
        Ok(video)
    }

    async fn get_video(&self, video_id: &str) -> StreamResult<RemoteVideo> {
        let url = self.video_url(video_id);
        let response = self
            .client
            .get(&url)
            .header("AccessKey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "Video fetch request failed to send");
                StreamError::VideoFetchFailed("backend unreachable".to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StreamError::VideoNotFound(video_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, video_id = %video_id, "Video fetch rejected");
            return Err(StreamError::VideoFetchFailed(format!(
                "backend returned status {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, video_id = %video_id, "Video fetch response unparsable");
            StreamError::VideoFetchFailed("unparsable backend response".to_string())
        })
    }
}
