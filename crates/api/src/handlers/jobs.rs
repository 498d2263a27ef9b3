//! Handlers for image-edit jobs.
//!
//! Submission is non-blocking: the handler stores a `pending` job, hands the
//! image to the background controller and answers `201` immediately. Clients
//! poll `GET /api/jobs/{id}` until the job is `completed` or `failed`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use haybi_core::error::CoreError;
use haybi_core::types::JobId;
use haybi_db::models::job::Job;
use haybi_pipeline::ImageUpload;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

/// Response body of `POST /api/jobs`.
#[derive(Debug, Serialize)]
pub struct JobCreated {
    pub job_id: JobId,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/jobs
///
/// Accepts a multipart form with a required `prompt` text field and a
/// required `image` file field. Unknown fields are ignored.
pub async fn create_job(
    _key: ApiKey,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut prompt: Option<String> = None;
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "prompt" => {
                prompt = Some(field.text().await?);
            }
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                let mut upload = ImageUpload::new(bytes.to_vec());
                if let Some(name) = file_name {
                    upload = upload.with_file_name(name);
                }
                if let Some(ct) = content_type {
                    upload = upload.with_content_type(ct);
                }
                image = Some(upload);
            }
            _ => {} // ignore unknown fields
        }
    }

    let prompt =
        prompt.ok_or_else(|| AppError::BadRequest("Missing required 'prompt' field".into()))?;
    let image =
        image.ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;
    let image_bytes = image.bytes.len();

    let job_id = state.jobs.submit(&prompt, image).await?;

    tracing::info!(%job_id, image_bytes, "Job accepted");

    Ok((StatusCode::CREATED, Json(JobCreated { job_id })))
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// GET /api/jobs/{id}
///
/// Ids that do not parse are reported as not found, the same as unknown ids.
pub async fn get_job(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Job>> {
    let job_id: JobId = id.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: id.clone(),
        })
    })?;

    let job = state.jobs.get_status(job_id).await?;
    Ok(Json(job))
}

/// GET /api/jobs
///
/// All jobs, newest first.
pub async fn list_jobs(_key: ApiKey, State(state): State<AppState>) -> AppResult<Json<Vec<Job>>> {
    let jobs = state.jobs.list_jobs().await?;
    Ok(Json(jobs))
}
