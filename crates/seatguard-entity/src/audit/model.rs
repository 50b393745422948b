//! Seat audit record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;

use seatguard_core::types::{AuditRecordId, OrganizationId, SessionId, UserId};

use super::action::SeatAuditAction;

/// Reason recorded when a session is released by an explicit logout.
pub const REASON_LOGOUT: &str = "logout";
/// Reason recorded when the sweeper reclaims an idle session.
pub const REASON_EXPIRED: &str = "expired";

/// An immutable entry in the seat audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuditRecord {
    /// Unique record identifier.
    pub id: AuditRecordId,
    /// Monotonic insertion order, used to break timestamp ties.
    pub sequence: i64,
    /// The organization whose seats were affected.
    pub organization_id: OrganizationId,
    /// The user involved, if the event is user-scoped.
    pub user_id: Option<UserId>,
    /// The session allocated or released, if any.
    pub session_id: Option<SessionId>,
    /// What happened.
    pub action: SeatAuditAction,
    /// Free-form context.
    pub details: serde_json::Value,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// A record to append inside a unit of work.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    /// Affected organization.
    pub organization_id: OrganizationId,
    /// Involved user.
    pub user_id: Option<UserId>,
    /// Affected session.
    pub session_id: Option<SessionId>,
    /// Event kind.
    pub action: SeatAuditAction,
    /// Free-form context.
    pub details: serde_json::Value,
    /// Event instant.
    pub created_at: DateTime<Utc>,
}

impl NewAuditRecord {
    /// A session was admitted.
    pub fn allocated(
        organization_id: OrganizationId,
        user_id: UserId,
        session_id: SessionId,
        active_after: u32,
        seat_limit: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            session_id: Some(session_id),
            action: SeatAuditAction::SeatAllocated,
            details: json!({ "active_seats": active_after, "seat_limit": seat_limit }),
            created_at: at,
        }
    }

    /// A session gave its seat back.
    pub fn deallocated(
        organization_id: OrganizationId,
        user_id: UserId,
        session_id: SessionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            session_id: Some(session_id),
            action: SeatAuditAction::SeatDeallocated,
            details: json!({ "reason": reason }),
            created_at: at,
        }
    }

    /// A login attempt was refused.
    pub fn limit_exceeded(
        organization_id: OrganizationId,
        user_id: UserId,
        active: u32,
        seat_limit: u32,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            session_id: None,
            action: SeatAuditAction::SeatLimitExceeded,
            details: json!({
                "active_seats": active,
                "seat_limit": seat_limit,
                "reason": reason,
            }),
            created_at: at,
        }
    }
}

/// Per-action record counts for one organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Number of `SEAT_ALLOCATED` records.
    pub allocated: u64,
    /// Number of `SEAT_DEALLOCATED` records.
    pub deallocated: u64,
    /// Number of `SEAT_LIMIT_EXCEEDED` records.
    pub limit_exceeded: u64,
}

impl AuditSummary {
    /// Count one record.
    pub fn record(&mut self, action: SeatAuditAction) {
        match action {
            SeatAuditAction::SeatAllocated => self.allocated += 1,
            SeatAuditAction::SeatDeallocated => self.deallocated += 1,
            SeatAuditAction::SeatLimitExceeded => self.limit_exceeded += 1,
        }
    }

    /// Seats the trail says are currently held.
    pub fn net_allocated(&self) -> i64 {
        self.allocated as i64 - self.deallocated as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_net() {
        let mut summary = AuditSummary::default();
        summary.record(SeatAuditAction::SeatAllocated);
        summary.record(SeatAuditAction::SeatAllocated);
        summary.record(SeatAuditAction::SeatDeallocated);
        summary.record(SeatAuditAction::SeatLimitExceeded);

        assert_eq!(summary.net_allocated(), 1);
        assert_eq!(summary.limit_exceeded, 1);
    }

    #[test]
    fn test_deallocated_details_carry_reason() {
        let record = NewAuditRecord::deallocated(
            OrganizationId::new(),
            UserId::new(),
            SessionId::new(),
            REASON_EXPIRED,
            Utc::now(),
        );
        assert_eq!(record.details["reason"], "expired");
        assert_eq!(record.action, SeatAuditAction::SeatDeallocated);
    }
}
