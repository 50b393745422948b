//! # seatguard-database
//!
//! The durable store behind the seat engine. [`SeatStore`] hands out
//! per-organization units of work ([`SeatUnit`]) that serialize every
//! seat-count-changing operation for one organization while leaving other
//! organizations untouched.
//!
//! Two implementations are provided:
//! - [`PgSeatStore`]: PostgreSQL, locking the organization row with
//!   `SELECT ... FOR UPDATE` inside a transaction.
//! - [`MemorySeatStore`]: in-process, one async mutex per organization and
//!   staged writes applied on commit.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;
pub use store::{SeatStore, SeatUnit};
