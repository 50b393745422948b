//! Seat admission, status reporting and reconciliation.

pub mod allocator;
pub mod reconciler;
pub mod status;

pub use allocator::{AllocationOutcome, MissingEntity, RejectionReason, SeatAllocator};
pub use reconciler::{ReconciliationReport, SeatReconciler};
pub use status::SeatStatus;
