//! Job status machine.
//!
//! A job moves `pending -> processing -> {completed | failed}` and never
//! leaves a terminal state. Status writes are requested through
//! [`StatusUpdate`], which ties `result_url` to the `completed` transition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an image-edit job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// String representation used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// `completed` and `failed` never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `self -> next` is a legal edge of the status machine.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Statuses from which a write of `self` is accepted: every legal
    /// predecessor plus `self` (re-applying a status is idempotent).
    pub fn accepted_from(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[JobStatus::Pending],
            JobStatus::Processing => &[JobStatus::Pending, JobStatus::Processing],
            JobStatus::Completed => &[JobStatus::Processing, JobStatus::Completed],
            JobStatus::Failed => &[JobStatus::Processing, JobStatus::Failed],
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A requested status write.
///
/// `pending` is only ever written on creation, so it has no variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Processing,
    Completed { result_url: String },
    Failed,
}

impl StatusUpdate {
    pub fn status(&self) -> JobStatus {
        match self {
            StatusUpdate::Processing => JobStatus::Processing,
            StatusUpdate::Completed { .. } => JobStatus::Completed,
            StatusUpdate::Failed => JobStatus::Failed,
        }
    }

    /// The URL to store alongside the status; `None` clears the column.
    pub fn result_url(&self) -> Option<&str> {
        match self {
            StatusUpdate::Completed { result_url } => Some(result_url),
            _ => None,
        }
    }
}
