//! # seatguard-core
//!
//! Core crate for SeatGuard. Contains configuration schemas, typed
//! identifiers, the session activity window, the clock abstraction,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other SeatGuard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
