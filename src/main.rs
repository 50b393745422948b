//! SeatGuard Server: per-organization concurrent session seat enforcement.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use seatguard_core::config::{AppConfig, StoreBackend};
use seatguard_core::error::AppError;
use seatguard_core::types::SystemClock;
use seatguard_database::{DatabasePool, MemorySeatStore, PgSeatStore, SeatStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment.
///
/// `SEATGUARD_ENV` picks the overlay (default `production`).
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SEATGUARD_ENV").unwrap_or_else(|_| "production".to_string());
    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SeatGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Durable store ────────────────────────────────────
    let (store, db): (Arc<dyn SeatStore>, Option<DatabasePool>) = match config.store.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database).await?;

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                seatguard_database::migration::run_migrations(db.pool()).await?;
                tracing::info!("Database migrations complete");
            }

            (Arc::new(PgSeatStore::new(db.clone())), Some(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; seats are not shared between processes");
            (Arc::new(MemorySeatStore::new()), None)
        }
    };

    // ── Step 2: Engine, scheduler and HTTP server ────────────────
    let result = seatguard_api::app::run_server(config, store, Arc::new(SystemClock)).await;

    if let Some(db) = db {
        db.close().await;
        tracing::info!("Database pool closed");
    }

    result
}
