//! Reconciliation of the audit trail against the live session set.
//!
//! Every stored session was created with one `SEAT_ALLOCATED` record and
//! every removed one with one `SEAT_DEALLOCATED` record, so with no unit of
//! work in flight `allocated - deallocated` equals the stored session count.
//! Expired sessions still count as stored until the next sweep removes them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use seatguard_core::error::AppError;
use seatguard_core::result::AppResult;
use seatguard_core::types::OrganizationId;
use seatguard_database::SeatStore;
use seatguard_entity::audit::AuditSummary;

use crate::audit::AuditTrail;
use crate::session::SessionLedger;

/// Comparison of the audit trail with the stored sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Organization id.
    pub organization_id: OrganizationId,
    /// Audit counts per action.
    pub audit: AuditSummary,
    /// `allocated - deallocated`.
    pub net_allocated: i64,
    /// Session rows currently stored (active or awaiting the sweep).
    pub stored_sessions: u32,
    /// Sessions inside the activity window.
    pub active_sessions: u32,
    /// Stored sessions already past the window.
    pub awaiting_sweep: u32,
    /// `net_allocated - stored_sessions`; zero when consistent.
    pub drift: i64,
}

impl ReconciliationReport {
    /// Whether the trail matches the stored sessions.
    pub fn is_consistent(&self) -> bool {
        self.drift == 0
    }
}

/// Produces [`ReconciliationReport`]s.
#[derive(Debug, Clone)]
pub struct SeatReconciler {
    store: Arc<dyn SeatStore>,
    ledger: SessionLedger,
    audit: AuditTrail,
}

impl SeatReconciler {
    /// Create a reconciler.
    pub fn new(store: Arc<dyn SeatStore>, ledger: SessionLedger, audit: AuditTrail) -> Self {
        Self {
            store,
            ledger,
            audit,
        }
    }

    /// Compare the audit trail of an organization with its sessions.
    ///
    /// Opens a unit of work first so no allocation, logout or sweep of the
    /// organization is half-applied while the numbers are read.
    pub async fn reconcile(&self, organization_id: OrganizationId) -> AppResult<ReconciliationReport> {
        let unit = self.store.begin(organization_id).await?;
        if unit.organization().is_none() {
            return Err(AppError::not_found(format!(
                "Organization {organization_id} not found"
            )));
        }

        let audit = self.audit.summarize(organization_id).await?;
        let stored_sessions = self.store.count_stored_sessions(organization_id).await?;
        let active_sessions = self.ledger.count_active(organization_id).await?;
        drop(unit);

        let net_allocated = audit.net_allocated();
        let report = ReconciliationReport {
            organization_id,
            audit,
            net_allocated,
            stored_sessions,
            active_sessions,
            awaiting_sweep: stored_sessions.saturating_sub(active_sessions),
            drift: net_allocated - i64::from(stored_sessions),
        };

        if report.is_consistent() {
            info!(
                organization_id = %organization_id,
                stored = stored_sessions,
                active = active_sessions,
                "Audit trail consistent with sessions"
            );
        } else {
            warn!(
                organization_id = %organization_id,
                net_allocated,
                stored = stored_sessions,
                drift = report.drift,
                "Audit trail drift detected"
            );
        }
        Ok(report)
    }
}
