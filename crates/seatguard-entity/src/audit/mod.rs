//! Seat audit trail entities.

pub mod action;
pub mod model;

pub use action::SeatAuditAction;
pub use model::{AuditRecord, AuditSummary, NewAuditRecord};
