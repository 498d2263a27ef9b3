//! In-process [`JobStore`] backed by a lock-guarded map.
//!
//! Used by tests and when the server runs without `DATABASE_URL`. Records
//! do not survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use haybi_core::status::{JobStatus, StatusUpdate};
use haybi_core::types::JobId;
use tokio::sync::RwLock;

use crate::models::job::Job;
use crate::store::{JobStore, StoreError};

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(
        &self,
        id: JobId,
        prompt: &str,
        original_path: &str,
    ) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let now = chrono::Utc::now();
        let job = Job {
            id,
            status: JobStatus::Pending,
            prompt: prompt.to_string(),
            original_path: original_path.to_string(),
            result_url: None,
            created_at: now,
            updated_at: now,
        };
        jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(jobs)
    }

    async fn update_status(&self, id: JobId, update: StatusUpdate) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let to = update.status();
        if !to.accepted_from().contains(&job.status) {
            return Err(StoreError::IllegalTransition {
                id,
                from: job.status,
                to,
            });
        }

        job.status = to;
        job.result_url = update.result_url().map(str::to_string);
        job.updated_at = chrono::Utc::now();
        Ok(job.clone())
    }
}
