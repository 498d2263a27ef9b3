#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use haybi_api::config::ServerConfig;
use haybi_api::router::build_app_router;
use haybi_api::state::AppState;
use haybi_db::MemoryJobStore;
use haybi_fal::{EditError, EditedImage, ImageEditor, ImagePayload};
use haybi_pipeline::JobController;

pub const RESULT_URL: &str = "https://cdn.example/out.png";
pub const BOUNDARY: &str = "haybi-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        api_key: None,
    }
}

/// Editor that returns [`RESULT_URL`] once the gate has been opened.
pub struct StubEditor {
    gate: Semaphore,
}

impl StubEditor {
    /// Edits complete immediately.
    pub fn instant() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(Semaphore::MAX_PERMITS / 2),
        })
    }

    /// Edits block until [`StubEditor::release`].
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
        })
    }

    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 4);
    }
}

#[async_trait]
impl ImageEditor for StubEditor {
    async fn edit(&self, _image: &ImagePayload, _prompt: &str) -> Result<EditedImage, EditError> {
        let _permit = self.gate.acquire().await.expect("gate closed");
        Ok(EditedImage {
            url: RESULT_URL.to_string(),
        })
    }
}

/// A running test application: the router plus a handle on its controller.
pub struct TestApp {
    pub router: Router,
    pub jobs: JobController,
}

impl TestApp {
    pub fn new(config: ServerConfig, editor: Arc<dyn ImageEditor>) -> Self {
        let jobs = JobController::new(Arc::new(MemoryJobStore::new()), editor);
        let state = AppState {
            jobs: jobs.clone(),
            config: Arc::new(config.clone()),
        };
        Self {
            router: build_app_router(state, &config),
            jobs,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Wait for every background job run to finish.
    pub async fn drain(&self) {
        assert!(
            self.jobs.shutdown(Duration::from_secs(5)).await,
            "background jobs did not finish in time"
        );
    }
}

/// Build the full application with the in-memory store and an instant editor.
pub fn build_test_app() -> TestApp {
    TestApp::new(test_config(), StubEditor::instant())
}

/// One multipart form part.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Encode a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

pub fn png_part() -> Part<'static> {
    Part::File {
        name: "image",
        file_name: "photo.png",
        content_type: "image/png",
        bytes: PNG_BYTES,
    }
}

/// `POST /api/jobs` request with the given parts and optional bearer key.
pub fn submit_request(parts: &[Part<'_>], api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/jobs").header(
        "content-type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(key) = api_key {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

/// Collect a response body into a `serde_json::Value`.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a valid job and return its id.
pub async fn submit_ok(app: &TestApp, prompt: &str) -> String {
    let response = app
        .send(submit_request(&[Part::Text("prompt", prompt), png_part()], None))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string()
}
