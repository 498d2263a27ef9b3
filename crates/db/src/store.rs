//! The job store contract.

use async_trait::async_trait;
use haybi_core::status::{JobStatus, StatusUpdate};
use haybi_core::types::JobId;

use crate::models::job::Job;

/// Errors raised by a [`JobStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} already exists")]
    DuplicateId(JobId),

    #[error("job {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("corrupt job record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable mapping from job id to job record.
///
/// Implementations must tolerate concurrent calls for different ids.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new `pending` job.
    async fn create(
        &self,
        id: JobId,
        prompt: &str,
        original_path: &str,
    ) -> Result<Job, StoreError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// All jobs, newest first.
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    /// Apply a status write and refresh `updated_at`.
    ///
    /// Re-applying the status a job already holds succeeds; any other
    /// write outside the status machine fails with
    /// [`StoreError::IllegalTransition`].
    async fn update_status(&self, id: JobId, update: StatusUpdate) -> Result<Job, StoreError>;

    /// Whether the backing storage is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
