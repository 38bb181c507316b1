//! Upload job queue: accepts materialized upload files, registers the video
//! on the backend, and transfers the file, all off the request path.
//!
//! One job owns its temporary file exclusively from submission to its
//! terminal state; the file is removed on every exit path. Within a job,
//! registration always completes before the transfer starts. Jobs are
//! independent of each other; nothing is shared or deduplicated between
//! them, and a submitted job runs to completion or failure.

use chrono::Utc;
use clipgate_core::models::{JobState, JobStatus};
use clipgate_core::{AppError, ErrorMetadata};
use clipgate_stream::{StreamError, VideoRegistrar, VideoUploader};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::{mpsc, RwLock, Semaphore};
use uuid::Uuid;

use crate::error::classify_stream_error;

/// Finished jobs kept for status lookup. Oldest are evicted beyond this.
const MAX_FINISHED_JOBS: usize = 1024;

/// One accepted upload: the materialized temp file and its original name.
#[derive(Debug)]
pub struct UploadJob {
    pub id: Uuid,
    pub file: NamedTempFile,
    pub file_name: String,
}

/// In-memory job states, keyed by the id returned at submission time.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    jobs: HashMap<Uuid, JobState>,
    finished: VecDeque<Uuid>,
}

impl JobRegistry {
    pub async fn get(&self, job_id: Uuid) -> Option<JobState> {
        self.inner.read().await.jobs.get(&job_id).cloned()
    }

    async fn insert(&self, state: JobState) {
        self.inner.write().await.jobs.insert(state.job_id, state);
    }

    async fn remove(&self, job_id: Uuid) {
        self.inner.write().await.jobs.remove(&job_id);
    }

    /// Apply `update` to the job's state. A job entering a terminal state is
    /// stamped and queued for eviction once the retention cap is reached.
    async fn update(&self, job_id: Uuid, update: impl FnOnce(&mut JobState)) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let Some(state) = inner.jobs.get_mut(&job_id) else {
            return;
        };
        let was_finished = state.status.is_finished();
        update(state);
        if !was_finished && state.status.is_finished() {
            state.finished_at = Some(Utc::now());
            inner.finished.push_back(job_id);
            while inner.finished.len() > MAX_FINISHED_JOBS {
                if let Some(evicted) = inner.finished.pop_front() {
                    inner.jobs.remove(&evicted);
                }
            }
        }
    }
}

/// Bounded queue feeding a semaphore-limited worker pool.
pub struct UploadJobQueue {
    tx: mpsc::Sender<UploadJob>,
    registry: JobRegistry,
}

impl UploadJobQueue {
    /// Create a new upload job queue with a bounded channel.
    ///
    /// # Arguments
    /// * `registrar` - Backend video registration client
    /// * `uploader` - Backend file transfer client
    /// * `max_concurrent` - Maximum number of concurrent upload jobs
    /// * `queue_size` - Bound of the submission channel; `submit()` fails
    ///   fast when the queue is full
    pub fn new(
        registrar: Arc<dyn VideoRegistrar>,
        uploader: Arc<dyn VideoUploader>,
        max_concurrent: usize,
        queue_size: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let registry = JobRegistry::default();

        // Spawn worker pool
        let worker_registry = registry.clone();
        tokio::spawn(async move {
            Self::worker_pool(rx, registrar, uploader, worker_registry, max_concurrent).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Upload job queue initialized with bounded channel"
        );

        Self { tx, registry }
    }

    /// Submit an upload job. Returns the job id immediately; the work runs
    /// on the worker pool and its outcome is observable via [`status`].
    ///
    /// [`status`]: UploadJobQueue::status
    #[tracing::instrument(skip(self, file), fields(job.file = %file_name))]
    pub async fn submit(&self, file: NamedTempFile, file_name: String) -> Result<Uuid, AppError> {
        let job = UploadJob {
            id: Uuid::new_v4(),
            file,
            file_name: file_name.clone(),
        };
        let job_id = job.id;

        self.registry.insert(JobState::new(job_id, file_name)).await;

        // Try to send, but handle the case where the queue is full. Dropping
        // the rejected job removes its temp file.
        if let Err(e) = self.tx.try_send(job) {
            self.registry.remove(job_id).await;
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!("Upload job queue is full, rejecting job");
                    AppError::QueueFull("Upload queue is full, please try again later".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    AppError::Internal("Upload job queue is not running".to_string())
                }
            });
        }

        tracing::info!(job_id = %job_id, "Upload job submitted");
        Ok(job_id)
    }

    /// Look up the state of a previously submitted job.
    pub async fn status(&self, job_id: Uuid) -> Option<JobState> {
        self.registry.get(job_id).await
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<UploadJob>,
        registrar: Arc<dyn VideoRegistrar>,
        uploader: Arc<dyn VideoUploader>,
        registry: JobRegistry,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        while let Some(job) = rx.recv().await {
            let permit = semaphore.clone().acquire_owned().await;
            let registrar = registrar.clone();
            let uploader = uploader.clone();
            let registry = registry.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(job, registrar, uploader, registry).await;
            });
        }
    }

    /// Run one job to its terminal state. Errors are classified and recorded
    /// in the registry; nothing propagates out of the worker.
    #[tracing::instrument(
        skip(job, registrar, uploader, registry),
        fields(job.id = %job.id, job.file = %job.file_name, job.status = tracing::field::Empty)
    )]
    async fn process_job(
        job: UploadJob,
        registrar: Arc<dyn VideoRegistrar>,
        uploader: Arc<dyn VideoUploader>,
        registry: JobRegistry,
    ) {
        let start = std::time::Instant::now();
        let UploadJob {
            id,
            file,
            file_name,
        } = job;

        let result =
            Self::register_and_upload(&file, &file_name, id, &registrar, &uploader, &registry)
                .await;

        let elapsed = start.elapsed();
        match result {
            Ok(video_id) => {
                tracing::Span::current().record("job.status", "success");
                registry
                    .update(id, |state| state.status = JobStatus::Completed)
                    .await;
                tracing::info!(
                    job_id = %id,
                    video_id = %video_id,
                    duration_ms = elapsed.as_millis(),
                    "Upload job completed successfully"
                );
            }
            Err(e) => {
                tracing::Span::current().record("job.status", "failed");
                let classified = classify_stream_error(e);
                let code = classified.error_code();
                registry
                    .update(id, |state| {
                        state.status = JobStatus::Failed;
                        state.error = Some(code.to_string());
                    })
                    .await;
                tracing::error!(
                    job_id = %id,
                    error = %classified,
                    error_code = code,
                    duration_ms = elapsed.as_millis(),
                    "Upload job failed"
                );
            }
        }

        // The temp file is released on every exit path.
        if let Err(e) = file.close() {
            tracing::warn!(job_id = %id, error = %e, "Failed to remove temporary upload file");
        }
    }

    /// Registration strictly precedes the transfer; a registration failure
    /// means the uploader is never invoked.
    async fn register_and_upload(
        file: &NamedTempFile,
        file_name: &str,
        job_id: Uuid,
        registrar: &Arc<dyn VideoRegistrar>,
        uploader: &Arc<dyn VideoUploader>,
        registry: &JobRegistry,
    ) -> Result<String, StreamError> {
        registry
            .update(job_id, |state| state.status = JobStatus::Registering)
            .await;
        let video = registrar.create_video(file_name).await?;

        registry
            .update(job_id, |state| {
                state.status = JobStatus::Uploading;
                state.video_id = Some(video.guid.clone());
            })
            .await;
        uploader.upload(file.path(), file_name, &video.guid).await?;

        Ok(video.guid)
    }
}

impl Clone for UploadJobQueue {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            registry: self.registry.clone(),
        }
    }
}
