use std::sync::Arc;

use haybi_pipeline::JobController;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Job lifecycle controller (store + remote editor + background tasks).
    pub jobs: JobController,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}
