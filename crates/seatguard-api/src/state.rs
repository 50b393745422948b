//! Application state shared across all handlers and extractors.

use std::sync::Arc;
use std::time::Instant;

use seatguard_auth::{PasswordHasher, SeatEngine};
use seatguard_core::config::AppConfig;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Seat allocator, session ledger, sweeper and audit trail
    pub engine: SeatEngine,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state from configuration and a wired engine.
    pub fn new(config: AppConfig, engine: SeatEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            password_hasher: Arc::new(PasswordHasher::new()),
            started_at: Instant::now(),
        }
    }
}
