use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of one background upload job.
///
/// `Uploading` is only ever entered after registration succeeded; once a
/// video id is recorded it never changes for the rest of the job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Registering,
    Uploading,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Registering => write!(f, "registering"),
            JobStatus::Uploading => write!(f, "uploading"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Observable state of an upload job, served by the status endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobState {
    pub job_id: Uuid,
    pub file_name: String,
    pub status: JobStatus,
    /// Backend video id, present once registration succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Stable error code when the job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobState {
    pub fn new(job_id: Uuid, file_name: String) -> Self {
        Self {
            job_id,
            file_name,
            status: JobStatus::Queued,
            video_id: None,
            error: None,
            submitted_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Acknowledgment returned by the upload endpoint before the job runs.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadAccepted {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}
