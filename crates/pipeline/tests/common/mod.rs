//! Test doubles for the job pipeline.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use haybi_core::status::StatusUpdate;
use haybi_core::types::JobId;
use haybi_db::models::job::Job;
use haybi_db::{JobStore, MemoryJobStore, StoreError};
use haybi_fal::api::EditTransport;
use haybi_fal::{EditError, EditedImage, FalEditClient, ImageEditor, ImagePayload, RetryPolicy};
use haybi_pipeline::{ImageUpload, JobController};
use tokio::sync::Semaphore;

pub const RESULT_URL: &str = "https://cdn.example/out.png";
pub const OK_BODY: &str = r#"{"images": [{"url": "https://cdn.example/out.png"}]}"#;

/// One scripted transport response.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Body(&'static str),
    Timeout,
}

/// Transport that replays a script, repeating the last entry forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        assert!(!script.is_empty());
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EditTransport for ScriptedTransport {
    async fn post(&self, _body: &serde_json::Value) -> Result<Vec<u8>, EditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                *script.front().unwrap()
            }
        };
        match step {
            Step::Body(body) => Ok(body.as_bytes().to_vec()),
            Step::Timeout => Err(EditError::Timeout),
        }
    }
}

/// Real retrying client over a scripted transport, with no delay between
/// attempts.
pub fn scripted_editor(transport: Arc<ScriptedTransport>) -> Arc<dyn ImageEditor> {
    Arc::new(FalEditClient::new(transport, RetryPolicy::immediate(3)))
}

/// Editor that succeeds only after `release` is called.
pub struct GatedEditor {
    gate: Semaphore,
}

impl GatedEditor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
        })
    }

    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl ImageEditor for GatedEditor {
    async fn edit(&self, _image: &ImagePayload, _prompt: &str) -> Result<EditedImage, EditError> {
        let _permit = self.gate.acquire().await.expect("gate closed");
        Ok(EditedImage {
            url: RESULT_URL.to_string(),
        })
    }
}

/// Editor that panics mid-call.
pub struct PanickingEditor;

#[async_trait]
impl ImageEditor for PanickingEditor {
    async fn edit(&self, _image: &ImagePayload, _prompt: &str) -> Result<EditedImage, EditError> {
        panic!("decoder exploded");
    }
}

/// Store wrapper that records every job snapshot produced by a status
/// write. It can hold status writes until released, and can fail a number
/// of upcoming writes with a database error.
pub struct RecordingStore {
    inner: MemoryJobStore,
    history: Mutex<Vec<Job>>,
    writes: Semaphore,
    failing_writes: AtomicU32,
}

impl RecordingStore {
    /// Status writes go through immediately.
    pub fn open() -> Arc<Self> {
        Self::with_permits(Semaphore::MAX_PERMITS / 2)
    }

    /// Status writes block until [`RecordingStore::release_writes`].
    pub fn gated() -> Arc<Self> {
        Self::with_permits(0)
    }

    fn with_permits(permits: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryJobStore::new(),
            history: Mutex::new(Vec::new()),
            writes: Semaphore::new(permits),
            failing_writes: AtomicU32::new(0),
        })
    }

    /// The next `n` status writes fail with a pool timeout.
    pub fn fail_next_writes(&self, n: u32) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    pub fn release_writes(&self) {
        self.writes.add_permits(Semaphore::MAX_PERMITS / 4);
    }

    /// Snapshots after each successful status write of `id`, in order.
    pub fn history(&self, id: JobId) -> Vec<Job> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.id == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobStore for RecordingStore {
    async fn create(
        &self,
        id: JobId,
        prompt: &str,
        original_path: &str,
    ) -> Result<Job, StoreError> {
        let job = self.inner.create(id, prompt, original_path).await?;
        self.history.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        self.inner.list().await
    }

    async fn update_status(&self, id: JobId, update: StatusUpdate) -> Result<Job, StoreError> {
        let _permit = self.writes.acquire().await.expect("write gate closed");
        let failing = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let job = self.inner.update_status(id, update).await?;
        self.history.lock().unwrap().push(job.clone());
        Ok(job)
    }
}

pub fn png_upload() -> ImageUpload {
    ImageUpload::new(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
        .with_file_name("photo.png")
        .with_content_type("image/png")
}

/// Wait until every background run has finished.
pub async fn drain(controller: &JobController) {
    assert!(
        controller.shutdown(Duration::from_secs(5)).await,
        "background jobs did not finish in time"
    );
}
