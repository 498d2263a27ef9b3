//! Service banner and metadata endpoints.
//!
//! Axum answers `HEAD` on every `get` route with the same headers and an
//! empty body, so uptime probes can use either method.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "Haybi Image Edit API";

const ENDPOINTS: Endpoints = Endpoints {
    health: "/health",
    info: "/api/info",
    jobs: "/api/jobs",
    job: "/api/jobs/{id}",
};

/// GET / payload.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

/// GET /api/info payload.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub info: &'static str,
    pub jobs: &'static str,
    pub job: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "Submit an image with an edit prompt and poll the job until it completes",
        endpoints: ENDPOINTS,
    })
}

/// `/` at the root level.
pub fn root_router() -> Router<AppState> {
    Router::new().route("/", get(root))
}

/// `/info`, mounted under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/info", get(info))
}
