//! Shared domain types: identifiers, the activity window and the clock.

pub mod activity;
pub mod clock;
pub mod id;

pub use activity::ActivityWindow;
pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{AuditRecordId, OrganizationId, SessionId, UserId};
