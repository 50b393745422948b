//! Append-only seat audit trail.

pub mod trail;

pub use trail::{AuditTrail, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
