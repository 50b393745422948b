//! Application builder: wires the seat engine, the sweep scheduler and the
//! router into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use seatguard_auth::SeatEngine;
use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;
use seatguard_core::types::Clock;
use seatguard_database::SeatStore;
use seatguard_worker::{SessionSweepJob, SweepScheduler};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the SeatGuard server over an already-connected store.
pub async fn run_server(
    config: AppConfig,
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
) -> Result<(), AppError> {
    tracing::info!("Starting SeatGuard server...");

    // ── Step 1: Seat engine ──────────────────────────────────────
    let engine = SeatEngine::new(store, clock, &config.session);
    tracing::info!(
        inactivity_timeout_minutes = config.session.inactivity_timeout_minutes,
        max_sessions_per_user = config.session.max_sessions_per_user,
        "Seat engine ready"
    );

    // ── Step 2: Sweep scheduler ──────────────────────────────────
    let mut scheduler = if config.sweeper.enabled {
        let job = Arc::new(SessionSweepJob::new(Arc::clone(&engine.sweeper)));
        let scheduler = SweepScheduler::new(job, config.sweeper.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::warn!("Sweeper disabled; expired sessions are only reclaimed lazily");
        None
    };

    // ── Step 3: HTTP server ──────────────────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(AppState::new(config, engine));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("SeatGuard server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 4: Stop background work ─────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(result) => result?,
            Err(_) => tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Sweep scheduler did not stop within the grace period"
            ),
        }
    }

    tracing::info!("SeatGuard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
