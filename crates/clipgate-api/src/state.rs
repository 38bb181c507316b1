//! Application state.
//!
//! One state object shared by all handlers: configuration, the URL signer,
//! the backend registrar, and the upload job queue. Everything here is
//! read-only after startup except the queue's internal job registry.

use clipgate_core::{Config, UrlSigner};
use clipgate_stream::VideoRegistrar;
use std::sync::Arc;

use crate::job_queue::UploadJobQueue;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub signer: UrlSigner,
    pub registrar: Arc<dyn VideoRegistrar>,
    pub uploads: UploadJobQueue,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
