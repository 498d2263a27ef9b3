use haybi_core::types::JobId;
use haybi_db::StoreError;
use haybi_fal::EditError;

/// Errors surfaced to callers of [`crate::JobController`].
///
/// Only admission and lookup fail this way; a job's own execution never
/// returns an error to anyone, it ends in the `failed` status instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The request was rejected before a job record was created.
    #[error("{0}")]
    Validation(String),

    #[error("job {0} not found")]
    NotFound(JobId),

    /// The controller is draining and no longer admits jobs.
    #[error("job controller is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a single background run ended in `failed`.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RunError {
    #[error("status write failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Edit(#[from] EditError),
}
