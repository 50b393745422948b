//! # seatguard-auth
//!
//! The seat engine: admission control, session lifecycle, expiry reclamation
//! and the audit trail, plus Argon2id password verification for the login
//! boundary.
//!
//! ## Modules
//!
//! - `seat`: atomic admission ([`SeatAllocator`]), seat status and reconciliation
//! - `session`: the [`SessionLedger`] and the [`SessionSweeper`]
//! - `audit`: the append-only [`AuditTrail`]
//! - `password`: Argon2id hashing
//!
//! Every seat-count-changing path opens one per-organization unit of work on
//! the store and writes its audit record inside that same unit.

pub mod audit;
pub mod engine;
pub mod password;
pub mod seat;
pub mod session;

pub use audit::AuditTrail;
pub use engine::SeatEngine;
pub use password::PasswordHasher;
pub use seat::{
    AllocationOutcome, MissingEntity, RejectionReason, SeatAllocator, SeatReconciler, SeatStatus,
};
pub use session::{SessionLedger, SessionSweeper, SweepReport};
