//! Clipgate Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! token-signing primitives shared across all Clipgate components.

pub mod config;
pub mod error;
pub mod models;
pub mod signing;

// Re-export commonly used types
pub use config::{BaseConfig, Config, SigningConfig, StreamConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use signing::{SignedUrl, UploadAuthorization, UrlSigner};
