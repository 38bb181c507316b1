//! Clipgate Stream Library
//!
//! This crate provides the outbound clients for the streaming backend: the
//! video-collection API client (registration and retrieval) and the
//! resumable upload client (tus 1.0.0). Both sit behind traits so the
//! orchestrator can be exercised with mocks.
//!
//! # Authorization
//!
//! The collection API authenticates with the `AccessKey` header. Resumable
//! uploads never see the API key directly; every tus request carries a
//! short-lived [`clipgate_core::UploadAuthorization`] signature scoped to
//! one video id.

pub mod api;
pub mod traits;
pub mod tus;

// Re-export commonly used types
pub use api::StreamApiClient;
pub use traits::{StreamError, StreamResult, VideoRegistrar, VideoUploader};
pub use tus::{TusUploadClient, UploadSession};
