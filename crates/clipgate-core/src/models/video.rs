use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Video entity as the streaming backend reports it.
///
/// The backend returns many more fields than we consume; only the ones the
/// service acts on are modeled, the rest are ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoteVideo {
    /// Backend-assigned video identifier. Non-empty on every registered video.
    pub guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Duration in seconds, once the backend has probed the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
    /// Backend processing status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, rename = "storageSize", skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<i64>,
    #[serde(default, rename = "dateUploaded", skip_serializing_if = "Option::is_none")]
    pub date_uploaded: Option<String>,
}

/// Body of the video-registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
}

impl CreateVideoRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}
