//! # seatguard-entity
//!
//! Domain entity models for SeatGuard. Every struct in this crate is either a
//! database row (deriving `sqlx::FromRow`) or a value object passed between
//! the seat engine and its store.

pub mod audit;
pub mod organization;
pub mod session;
pub mod user;
