//! Audit trail access.
//!
//! Appends only happen inside a caller's unit of work, never as a detached
//! side effect, so a failed append rolls back the change it describes.

use std::sync::Arc;

use tracing::{debug, error};

use seatguard_core::error::AppError;
use seatguard_core::result::AppResult;
use seatguard_core::types::OrganizationId;
use seatguard_database::{SeatStore, SeatUnit};
use seatguard_entity::audit::{AuditRecord, AuditSummary, NewAuditRecord};

/// Records returned by [`AuditTrail::query`] when no limit is given.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;
/// Largest page [`AuditTrail::query`] will return.
pub const MAX_QUERY_LIMIT: u32 = 1000;

/// Reader and writer of the seat audit log.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    store: Arc<dyn SeatStore>,
}

impl AuditTrail {
    /// Create an audit trail over `store`.
    pub fn new(store: Arc<dyn SeatStore>) -> Self {
        Self { store }
    }

    /// Append `record` inside `unit`.
    ///
    /// The record must belong to the unit's organization. On failure the
    /// caller must abandon the unit.
    pub async fn append(
        &self,
        unit: &mut dyn SeatUnit,
        record: NewAuditRecord,
    ) -> AppResult<AuditRecord> {
        if record.organization_id != unit.organization_id() {
            return Err(AppError::internal(format!(
                "Audit record for organization {} appended to unit of organization {}",
                record.organization_id,
                unit.organization_id()
            )));
        }

        let action = record.action;
        let organization_id = record.organization_id;
        unit.append_audit(record).await.map_err(|e| {
            error!(
                organization_id = %organization_id,
                action = %action,
                error = %e,
                "Audit append failed, abandoning unit of work"
            );
            e
        })
    }

    /// Newest-first records of an organization.
    ///
    /// `limit` is clamped to `1..=MAX_QUERY_LIMIT`.
    pub async fn query(
        &self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> AppResult<Vec<AuditRecord>> {
        let clamped = limit.clamp(1, MAX_QUERY_LIMIT);
        if clamped != limit {
            debug!(requested = limit, applied = clamped, "Audit query limit clamped");
        }
        self.store.recent_audit(organization_id, clamped).await
    }

    /// Per-action counts of an organization.
    pub async fn summarize(&self, organization_id: OrganizationId) -> AppResult<AuditSummary> {
        self.store.summarize_audit(organization_id).await
    }
}
