//! Taskbeat - health endpoints backed by a background task queue
//!
//! Serves the health API, runs the worker pool and drives the periodic
//! maintenance jobs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskbeat::api::{create_router, AppState};
use taskbeat::config::Config;
use taskbeat::scheduler::{FileScheduleStore, Scheduler, SystemClock};

/// Main entry point for the taskbeat server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the built-in jobs and start the worker pool
/// 4. Load persisted schedule state and start the scheduler
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM stop the scheduler, then drain the workers
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskbeat=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting taskbeat");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, workers={}, job_timeout={}s, tick={}s, probe_target={:?}",
        config.server_port,
        config.worker_count,
        config.job_timeout,
        config.scheduler_tick,
        config.probe_target
    );

    // A duplicate job name here is a configuration bug; refuse to start.
    let (state, workers) =
        AppState::from_config(&config).context("failed to register built-in jobs")?;
    info!("Registered jobs: {}", state.executor.registry().names().join(", "));

    let schedule_store = FileScheduleStore::open(&config.schedule_state_path)
        .await
        .context("failed to open schedule state")?;
    info!("Schedule state at {}", schedule_store.path().display());

    let scheduler = Scheduler::new(
        state.executor.registry(),
        state.executor.clone(),
        Arc::new(schedule_store),
    )
    .await;
    let scheduler_handle = scheduler.spawn(Arc::new(SystemClock), config.scheduler_tick());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler_handle.abort();
    warn!("Scheduler stopped");
    workers.shutdown_and_join().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
