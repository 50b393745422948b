//! # seatguard-api
//!
//! HTTP API layer for SeatGuard built on Axum.
//!
//! Login admits a session through the seat allocator, logout and heartbeat
//! go through the session ledger, and the organization routes expose seat
//! status, live sessions and the audit trail to callers holding an active
//! session of that organization.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
