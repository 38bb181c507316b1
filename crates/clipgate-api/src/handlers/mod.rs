//! HTTP handlers, one module per endpoint group.

pub mod jobs;
pub mod video_get;
pub mod video_link;
pub mod video_upload;
