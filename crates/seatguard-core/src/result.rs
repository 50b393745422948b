//! Convenience result type alias for SeatGuard.

use crate::error::AppError;

/// A specialized `Result` type for SeatGuard operations.
pub type AppResult<T> = Result<T, AppError>;
