//! SQL repositories.
//!
//! Every function is generic over [`sqlx::PgExecutor`], so the same query runs
//! against the pool for plain reads and against an open transaction inside a
//! unit of work.

pub mod audit;
pub mod organization;
pub mod session;
pub mod user;

pub use audit::AuditRepository;
pub use organization::OrganizationRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use seatguard_core::error::{AppError, ErrorKind};

/// Map a sqlx error to a store failure with context.
pub(crate) fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Store, context, e)
}

/// Like [`store_error`], but reports unique-key violations as conflicts.
pub(crate) fn insert_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let unique = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        let kind = if unique {
            ErrorKind::Conflict
        } else {
            ErrorKind::Store
        };
        AppError::with_source(kind, context, e)
    }
}

/// Clamp a SQL `COUNT(*)` into the `u32` domain used for seat counts.
pub(crate) fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
