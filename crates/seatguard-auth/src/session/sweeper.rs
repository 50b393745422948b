//! Expiry sweeper.
//!
//! Reclaims seats held by sessions idle past the activity window. Each
//! organization is swept in its own unit of work, so deletes and their
//! `SEAT_DEALLOCATED` records commit together or not at all, and a failing
//! organization does not hold back the others.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use seatguard_core::result::AppResult;
use seatguard_core::types::{ActivityWindow, Clock, OrganizationId};
use seatguard_database::SeatStore;
use seatguard_entity::audit::NewAuditRecord;
use seatguard_entity::audit::model::REASON_EXPIRED;
use seatguard_entity::session::Session;

use crate::audit::AuditTrail;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Organizations that had expired sessions.
    pub organizations_swept: u32,
    /// Sessions deleted (and audited).
    pub sessions_reclaimed: u32,
    /// Organizations whose batch failed and was rolled back.
    pub failed_batches: Vec<OrganizationId>,
}

impl SweepReport {
    /// Whether every batch committed.
    pub fn is_clean(&self) -> bool {
        self.failed_batches.is_empty()
    }
}

/// Deletes expired sessions and audits each deletion.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
    window: ActivityWindow,
    audit: AuditTrail,
}

impl SessionSweeper {
    /// Create a sweeper sharing the ledger's window.
    pub fn new(
        store: Arc<dyn SeatStore>,
        clock: Arc<dyn Clock>,
        window: ActivityWindow,
        audit: AuditTrail,
    ) -> Self {
        Self {
            store,
            clock,
            window,
            audit,
        }
    }

    /// Run one sweep pass.
    ///
    /// Safe to call at any time and from several tasks: an organization whose
    /// sessions were already reclaimed simply yields an empty batch. Errors
    /// are only returned when the set of organizations cannot be listed;
    /// per-organization failures are logged and reported in the result.
    pub async fn sweep_once(&self) -> AppResult<SweepReport> {
        let cutoff = self.window.cutoff(self.clock.now());
        let organizations = self.store.organizations_with_expired(cutoff).await?;

        let mut report = SweepReport::default();
        for organization_id in organizations {
            match self.sweep_organization(organization_id).await {
                Ok(reclaimed) => {
                    if !reclaimed.is_empty() {
                        report.organizations_swept += 1;
                        report.sessions_reclaimed +=
                            u32::try_from(reclaimed.len()).unwrap_or(u32::MAX);
                    }
                }
                Err(e) => {
                    error!(
                        organization_id = %organization_id,
                        error = %e,
                        "Sweep batch failed, will retry on next run"
                    );
                    report.failed_batches.push(organization_id);
                }
            }
        }

        if report.sessions_reclaimed > 0 {
            info!(
                organizations = report.organizations_swept,
                reclaimed = report.sessions_reclaimed,
                "Expired sessions reclaimed"
            );
        }
        if !report.is_clean() {
            warn!(failed = report.failed_batches.len(), "Sweep finished with failures");
        }
        Ok(report)
    }

    /// Reclaims one organization's expired sessions.
    ///
    /// The clock is read only once the organization's unit is held, so the
    /// records written here never predate a change committed ahead of them.
    async fn sweep_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Session>> {
        let mut unit = self.store.begin(organization_id).await?;
        let now = self.clock.now();
        let expired = unit.delete_expired(self.window.cutoff(now)).await?;
        if expired.is_empty() {
            return Ok(expired);
        }

        for session in &expired {
            self.audit
                .append(
                    unit.as_mut(),
                    NewAuditRecord::deallocated(
                        organization_id,
                        session.user_id,
                        session.id,
                        REASON_EXPIRED,
                        now,
                    ),
                )
                .await?;
        }
        unit.commit().await?;

        for session in &expired {
            info!(
                session_id = %session.id,
                user_id = %session.user_id,
                organization_id = %organization_id,
                idle_minutes = session.idle_for(now).num_minutes(),
                "Expired session reclaimed"
            );
        }
        Ok(expired)
    }
}
