use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use haybi_db::{DbPool, JobRepo, JobStore, MemoryJobStore};
use haybi_fal::{FalConfig, FalEditClient, ImageEditor};
use haybi_pipeline::JobController;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haybi_api::config::ServerConfig;
use haybi_api::router::build_app_router;
use haybi_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "haybi_api=debug,haybi_pipeline=debug,haybi_fal=debug,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Job store ---
    let (store, pool): (Arc<dyn JobStore>, Option<DbPool>) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = haybi_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            haybi_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            haybi_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn JobStore> = Arc::new(JobRepo::new(pool.clone()));
            (store, Some(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, jobs are kept in memory and lost on restart");
            let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
            (store, None)
        }
    };

    // --- Image editor ---
    let fal_config = FalConfig::from_env();
    tracing::info!(url = %fal_config.url, timeout = ?fal_config.timeout, "Loaded fal.ai configuration");
    let editor: Arc<dyn ImageEditor> = Arc::new(
        FalEditClient::from_config(&fal_config).expect("Failed to build fal.ai HTTP client"),
    );

    // --- Job controller ---
    let jobs = JobController::new(store, editor);

    // --- App state ---
    let state = AppState {
        jobs: jobs.clone(),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Let running jobs reach a terminal status before the store goes away.
    let drained = jobs
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if !drained {
        tracing::warn!("Exiting with unfinished jobs; they stay in a non-terminal status");
    }

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
