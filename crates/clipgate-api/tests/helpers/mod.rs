//! Test helpers: mock backend clients and AppState/router assembly.
//!
//! Run from the workspace root: `cargo test -p clipgate-api`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use clipgate_api::job_queue::UploadJobQueue;
use clipgate_api::setup::routes;
use clipgate_api::state::AppState;
use clipgate_core::config::{BaseConfig, Config, SigningConfig, StreamConfig, UploadConfig};
use clipgate_core::models::{JobState, RemoteVideo};
use clipgate_core::UrlSigner;
use clipgate_stream::{StreamError, StreamResult, VideoRegistrar, VideoUploader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

pub const TEST_SECURITY_KEY: &str = "test-security-key";
pub const TEST_CDN_HOSTNAME: &str = "vz-test.b-cdn.net";

/// Configuration for tests; small queue bounds so limits are testable.
pub fn test_config() -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
        },
        stream: StreamConfig {
            api_base_url: "http://localhost:1".to_string(),
            tus_upload_url: "http://localhost:1/tusupload".to_string(),
            library_id: "42".to_string(),
            api_key: "test-api-key".to_string(),
            request_timeout_secs: 5,
        },
        signing: SigningConfig {
            cdn_hostname: TEST_CDN_HOSTNAME.to_string(),
            security_key: TEST_SECURITY_KEY.to_string(),
            token_validity_secs: 3600,
            upload_auth_validity_secs: 600,
        },
        upload: UploadConfig {
            chunk_size_bytes: 1024,
            max_concurrent: 2,
            queue_size: 16,
            max_video_size_bytes: 8 * 1024 * 1024,
        },
    }
}

/// Mock registrar handing out sequential ids, or failing on demand.
pub struct MockRegistrar {
    create_calls: AtomicUsize,
    fail_create: bool,
    fixed_guid: Option<String>,
}

impl MockRegistrar {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            create_calls: AtomicUsize::new(0),
            fail_create: false,
            fixed_guid: None,
        })
    }

    /// Every registration returns the same id (for end-to-end assertions).
    pub fn with_fixed_guid(guid: &str) -> Arc<Self> {
        Arc::new(Self {
            create_calls: AtomicUsize::new(0),
            fail_create: false,
            fixed_guid: Some(guid.to_string()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            create_calls: AtomicUsize::new(0),
            fail_create: true,
            fixed_guid: None,
        })
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRegistrar for MockRegistrar {
    async fn create_video(&self, title: &str) -> StreamResult<RemoteVideo> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(StreamError::VideoCreationFailed(
                "backend returned status 500".to_string(),
            ));
        }
        let guid = self
            .fixed_guid
            .clone()
            .unwrap_or_else(|| format!("guid-{}", call));
        Ok(RemoteVideo {
            guid,
            title: Some(title.to_string()),
            length: None,
            status: Some(0),
            storage_size: None,
            date_uploaded: None,
        })
    }

    async fn get_video(&self, video_id: &str) -> StreamResult<RemoteVideo> {
        if video_id == "missing" {
            return Err(StreamError::VideoNotFound(video_id.to_string()));
        }
        Ok(RemoteVideo {
            guid: video_id.to_string(),
            title: Some("clip.mp4".to_string()),
            length: Some(12),
            status: Some(4),
            storage_size: None,
            date_uploaded: None,
        })
    }
}

/// One observed call to the mock uploader.
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub path: PathBuf,
    pub title: String,
    pub video_id: String,
}

/// Mock uploader recording calls; can fail, and can hold uploads at a gate
/// until the test releases them.
pub struct MockUploader {
    calls: Mutex<Vec<UploadCall>>,
    started: AtomicUsize,
    failure: Option<fn() -> StreamError>,
    gate: Option<Arc<Semaphore>>,
}

impl MockUploader {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            failure: None,
            gate: None,
        })
    }

    pub fn failing(failure: fn() -> StreamError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            failure: Some(failure),
            gate: None,
        })
    }

    /// Uploads block until [`release`] adds permits.
    ///
    /// [`release`]: MockUploader::release
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            failure: None,
            gate: Some(Arc::new(Semaphore::new(0))),
        })
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoUploader for MockUploader {
    async fn upload(&self, file_path: &Path, title: &str, video_id: &str) -> StreamResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        self.calls.lock().unwrap().push(UploadCall {
            path: file_path.to_path_buf(),
            title: title.to_string(),
            video_id: video_id.to_string(),
        });
        Ok(())
    }
}

/// Assemble application state around mock backend clients.
pub fn test_state(
    config: Config,
    registrar: Arc<MockRegistrar>,
    uploader: Arc<MockUploader>,
) -> Arc<AppState> {
    let signer = UrlSigner::new(
        config.signing.security_key.clone(),
        config.signing.token_validity_secs,
    );
    let uploads = UploadJobQueue::new(
        registrar.clone(),
        uploader,
        config.upload.max_concurrent,
        config.upload.queue_size,
    );
    Arc::new(AppState {
        config,
        signer,
        registrar,
        uploads,
    })
}

/// Test server over the full router with mock backend clients.
pub fn test_server(registrar: Arc<MockRegistrar>, uploader: Arc<MockUploader>) -> TestServer {
    let config = test_config();
    let state = test_state(config.clone(), registrar, uploader);
    let router = routes::setup_routes(&config, state).expect("router setup");
    TestServer::new(router).expect("test server")
}

/// Poll a job until it reaches a terminal state.
pub async fn wait_for_finished(queue: &UploadJobQueue, job_id: Uuid) -> JobState {
    for _ in 0..200 {
        if let Some(state) = queue.status(job_id).await {
            if state.status.is_finished() {
                return state;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not finish in time", job_id);
}

/// Spin until `condition` holds, or panic after the timeout.
pub async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}
