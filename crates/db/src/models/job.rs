//! Job entity model.

use haybi_core::status::JobStatus;
use haybi_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::StoreError;

/// A tracked image-edit job.
///
/// `result_url` is `Some` exactly when `status` is `completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub prompt: String,
    pub original_path: String,
    pub result_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A raw row from the `jobs` table, before the status column is parsed.
#[derive(Debug, FromRow)]
pub(crate) struct JobRow {
    pub id: uuid::Uuid,
    pub status: String,
    pub prompt: String,
    pub original_path: String,
    pub result_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<JobStatus>()
            .map_err(|e| StoreError::Corrupt(format!("job {}: {e}", row.id)))?;

        Ok(Job {
            id: JobId::from_uuid(row.id),
            status,
            prompt: row.prompt,
            original_path: row.original_path,
            result_url: row.result_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
