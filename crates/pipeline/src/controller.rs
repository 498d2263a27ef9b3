//! The job lifecycle controller.
//!
//! `submit` persists a `pending` job and hands it to a detached task on a
//! [`TaskTracker`]; nothing awaits that task. The task writes `processing`,
//! calls the image editor, and performs exactly one terminal write. Every
//! failure inside the task, panics included, becomes `failed`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use haybi_core::status::{JobStatus, StatusUpdate};
use haybi_core::types::JobId;
use haybi_db::models::job::Job;
use haybi_db::{JobStore, StoreError};
use haybi_fal::{EditedImage, ImageEditor, ImagePayload};
use tokio_util::task::TaskTracker;

use crate::error::{PipelineError, RunError};
use crate::upload::ImageUpload;

/// Creates jobs, launches their background runs, and serves lookups.
///
/// Cheap to clone; clones share the same store, editor and task set.
#[derive(Clone)]
pub struct JobController {
    store: Arc<dyn JobStore>,
    editor: Arc<dyn ImageEditor>,
    tasks: TaskTracker,
}

impl JobController {
    pub fn new(store: Arc<dyn JobStore>, editor: Arc<dyn ImageEditor>) -> Self {
        Self {
            store,
            editor,
            tasks: TaskTracker::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Admit a new job and schedule its execution.
    ///
    /// Returns as soon as the `pending` record is stored; the remote call
    /// happens in the background.
    pub async fn submit(&self, prompt: &str, upload: ImageUpload) -> Result<JobId, PipelineError> {
        if prompt.trim().is_empty() {
            return Err(PipelineError::Validation("prompt must not be empty".into()));
        }
        if upload.bytes.is_empty() {
            return Err(PipelineError::Validation("image must not be empty".into()));
        }
        if self.tasks.is_closed() {
            return Err(PipelineError::ShuttingDown);
        }

        let id = JobId::generate();
        let original_path = upload.original_path(id);
        self.store.create(id, prompt, &original_path).await?;

        tracing::info!(
            job_id = %id,
            image_bytes = upload.bytes.len(),
            original_path = %original_path,
            "Job submitted",
        );

        let this = self.clone();
        let prompt = prompt.to_string();
        let image = upload.into_payload();
        self.tasks.spawn(async move { this.run(id, prompt, image).await });

        Ok(id)
    }

    /// Background body of a job. Never returns an error and never panics
    /// outward; the outcome is recorded in the store.
    pub async fn run(&self, id: JobId, prompt: String, image: ImagePayload) {
        let outcome = AssertUnwindSafe(self.execute(id, &prompt, &image))
            .catch_unwind()
            .await;

        let update = match outcome {
            Ok(Ok(edited)) => {
                tracing::info!(job_id = %id, result_url = %edited.url, "Job completed");
                StatusUpdate::Completed {
                    result_url: edited.url,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id = %id, error = %e, "Job failed");
                StatusUpdate::Failed
            }
            Err(panic) => {
                tracing::error!(
                    job_id = %id,
                    panic = %panic_message(panic.as_ref()),
                    "Job execution panicked",
                );
                StatusUpdate::Failed
            }
        };

        if let Err(e) = self.finish(id, update).await {
            tracing::error!(job_id = %id, error = %e, "Failed to record terminal job status");
        }
    }

    /// The single terminal write for this job.
    ///
    /// A run whose `processing` write failed still has a `pending` job, and
    /// `pending -> failed` is not a legal edge. In that case `processing` is
    /// written first so the job still reaches `failed`.
    async fn finish(&self, id: JobId, update: StatusUpdate) -> Result<Job, StoreError> {
        match self.store.update_status(id, update.clone()).await {
            Err(StoreError::IllegalTransition {
                from: JobStatus::Pending,
                to: JobStatus::Failed,
                ..
            }) => {
                tracing::debug!(job_id = %id, "Job never left pending, moving through processing");
                self.store.update_status(id, StatusUpdate::Processing).await?;
                self.store.update_status(id, update).await
            }
            other => other,
        }
    }

    async fn execute(
        &self,
        id: JobId,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<EditedImage, RunError> {
        self.store.update_status(id, StatusUpdate::Processing).await?;
        tracing::debug!(job_id = %id, "Job processing");

        Ok(self.editor.edit(image, prompt).await?)
    }

    pub async fn get_status(&self, id: JobId) -> Result<Job, PipelineError> {
        self.store
            .get(id)
            .await?
            .ok_or(PipelineError::NotFound(id))
    }

    /// All jobs, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, PipelineError> {
        Ok(self.store.list().await?)
    }

    /// Number of background runs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Stop admitting jobs and wait up to `grace` for running ones to
    /// reach a terminal state. Running jobs are never aborted.
    ///
    /// Returns `true` if every run finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tasks.close();
        let remaining = self.tasks.len();
        tracing::info!(remaining, "Draining in-flight jobs");

        match tokio::time::timeout(grace, self.tasks.wait()).await {
            Ok(()) => {
                tracing::info!("All in-flight jobs finished");
                true
            }
            Err(_) => {
                tracing::warn!(
                    remaining = self.tasks.len(),
                    grace_secs = grace.as_secs(),
                    "Jobs still running after grace period",
                );
                false
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
