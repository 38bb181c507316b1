//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipgate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipgate API",
        version = "0.1.0",
        description = "Video delivery gateway: signed, path-scoped CDN playback links and resumable uploads to the streaming backend."
    ),
    paths(
        handlers::video_link::video_link,
        handlers::video_link::thumbnail_link,
        handlers::video_get::get_video,
        handlers::video_upload::upload_video,
        handlers::jobs::upload_status,
    ),
    components(schemas(
        error::ErrorResponse,
        models::JobState,
        models::JobStatus,
        models::UploadAccepted,
        models::RemoteVideo,
    )),
    tags(
        (name = "videos", description = "Playback links and video metadata"),
        (name = "uploads", description = "Upload job submission and status")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
