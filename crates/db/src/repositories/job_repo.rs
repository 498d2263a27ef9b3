//! PostgreSQL implementation of [`JobStore`] over the `jobs` table.
//!
//! Status values are written through [`JobStatus::as_str`]; the legal
//! predecessor check for a status write happens inside the `UPDATE`
//! statement itself so it cannot race with another writer.

use async_trait::async_trait;
use haybi_core::status::{JobStatus, StatusUpdate};
use haybi_core::types::JobId;
use sqlx::PgPool;

use crate::models::job::{Job, JobRow};
use crate::store::{JobStore, StoreError};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, status, prompt, original_path, result_url, \
    created_at, updated_at";

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Pool-backed job store.
#[derive(Clone)]
pub struct JobRepo {
    pool: PgPool,
}

impl JobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }
}

#[async_trait]
impl JobStore for JobRepo {
    async fn create(
        &self,
        id: JobId,
        prompt: &str,
        original_path: &str,
    ) -> Result<Job, StoreError> {
        let query = format!(
            "INSERT INTO jobs (id, status, prompt, original_path) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id.as_uuid())
            .bind(JobStatus::Pending.as_str())
            .bind(prompt)
            .bind(original_path)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
                {
                    StoreError::DuplicateId(id)
                }
                _ => StoreError::Database(e),
            })?;

        Job::try_from(row)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.find_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM jobs ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, JobRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Job::try_from)
            .collect()
    }

    async fn update_status(&self, id: JobId, update: StatusUpdate) -> Result<Job, StoreError> {
        let to = update.status();
        let accepted: Vec<&str> = to.accepted_from().iter().map(|s| s.as_str()).collect();

        let query = format!(
            "UPDATE jobs \
             SET status = $2, result_url = $3, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($4) \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, JobRow>(&query)
            .bind(id.as_uuid())
            .bind(to.as_str())
            .bind(update.result_url())
            .bind(&accepted)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Job::try_from(row),
            // Nothing matched: either the id is unknown or the current
            // status does not accept this write.
            None => match self.find_by_id(id).await? {
                Some(current) => Err(StoreError::IllegalTransition {
                    id,
                    from: current.status,
                    to,
                }),
                None => Err(StoreError::NotFound(id)),
            },
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
