//! Atomic seat allocation.
//!
//! `try_allocate` reads the seat limit, counts the active sessions and either
//! inserts the new session or records the rejection, all inside one
//! per-organization unit of work. Two concurrent calls for the same
//! organization can never both observe the same count.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use seatguard_core::result::AppResult;
use seatguard_core::types::{OrganizationId, UserId};
use seatguard_database::{SeatStore, SeatUnit};
use seatguard_entity::audit::NewAuditRecord;
use seatguard_entity::organization::Organization;
use seatguard_entity::session::{Session, SessionToken};

use super::status::SeatStatus;
use crate::audit::AuditTrail;
use crate::session::SessionLedger;

/// Why an allocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Every seat of the organization is taken.
    SeatLimit,
    /// The user already holds the configured maximum number of sessions.
    UserSessionLimit,
}

impl RejectionReason {
    /// Value recorded in the audit details.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeatLimit => "seat_limit",
            Self::UserSessionLimit => "user_session_limit",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entity an allocation referred to but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEntity {
    /// The organization does not exist.
    Organization,
    /// The user does not exist or belongs to another organization.
    User,
}

/// Result of an allocation attempt that reached a decision.
///
/// Store and audit failures are not outcomes; they are returned as errors.
#[derive(Debug, Clone)]
pub enum AllocationOutcome {
    /// A seat was granted.
    Admitted {
        /// The raw session token, handed out exactly once.
        token: SessionToken,
        /// The stored session.
        session: Session,
    },
    /// No seat was granted; nothing but the rejection record was written.
    Rejected {
        /// Active sessions observed at decision time.
        active: u32,
        /// The organization's seat limit.
        seat_limit: u32,
        /// Which limit was hit.
        reason: RejectionReason,
    },
    /// Nothing was written.
    NotFound(MissingEntity),
}

impl AllocationOutcome {
    /// Whether a seat was granted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    /// Whether the attempt was refused for capacity.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Decides admission against an organization's seat limit.
#[derive(Debug, Clone)]
pub struct SeatAllocator {
    store: Arc<dyn SeatStore>,
    ledger: SessionLedger,
    audit: AuditTrail,
    /// Per-user session cap; `0` disables it.
    max_sessions_per_user: u32,
}

impl SeatAllocator {
    /// Create an allocator.
    pub fn new(
        store: Arc<dyn SeatStore>,
        ledger: SessionLedger,
        audit: AuditTrail,
        max_sessions_per_user: u32,
    ) -> Self {
        Self {
            store,
            ledger,
            audit,
            max_sessions_per_user,
        }
    }

    /// Try to admit a new session for `user_id` in `organization_id`.
    ///
    /// Admits iff the organization's active count is strictly below its seat
    /// limit (and the user is below the per-user cap, when configured).
    /// Either the session and its `SEAT_ALLOCATED` record, or the
    /// `SEAT_LIMIT_EXCEEDED` record alone, are committed. Any store or audit
    /// failure rolls the whole unit back and is returned as an error; it is
    /// never retried here.
    pub async fn try_allocate(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<AllocationOutcome> {
        let mut unit = self.store.begin(organization_id).await?;

        let Some(organization) = unit.organization().cloned() else {
            debug!(organization_id = %organization_id, "Allocation for unknown organization");
            return Ok(AllocationOutcome::NotFound(MissingEntity::Organization));
        };

        match unit.find_user(user_id).await? {
            Some(user) if user.belongs_to(organization_id) => {}
            _ => {
                debug!(
                    organization_id = %organization_id,
                    user_id = %user_id,
                    "Allocation for unknown user"
                );
                return Ok(AllocationOutcome::NotFound(MissingEntity::User));
            }
        }

        let now = self.ledger.now();
        let cutoff = self.ledger.window().cutoff(now);
        let active = unit.count_active(cutoff).await?;
        let seat_limit = organization.capacity();

        if !organization.admits(active) {
            return self
                .reject(unit, &organization, user_id, active, RejectionReason::SeatLimit)
                .await;
        }

        if self.max_sessions_per_user > 0 {
            let held = unit.count_active_for_user(user_id, cutoff).await?;
            if held >= self.max_sessions_per_user {
                return self
                    .reject(
                        unit,
                        &organization,
                        user_id,
                        active,
                        RejectionReason::UserSessionLimit,
                    )
                    .await;
            }
        }

        let (token, session) = self.ledger.create(unit.as_mut(), user_id, now).await?;
        self.audit
            .append(
                unit.as_mut(),
                NewAuditRecord::allocated(
                    organization_id,
                    user_id,
                    session.id,
                    active + 1,
                    seat_limit,
                    now,
                ),
            )
            .await?;
        unit.commit().await?;

        info!(
            organization_id = %organization_id,
            user_id = %user_id,
            session_id = %session.id,
            active = active + 1,
            seat_limit,
            "Seat allocated"
        );
        Ok(AllocationOutcome::Admitted { token, session })
    }

    async fn reject(
        &self,
        mut unit: Box<dyn SeatUnit>,
        organization: &Organization,
        user_id: UserId,
        active: u32,
        reason: RejectionReason,
    ) -> AppResult<AllocationOutcome> {
        let seat_limit = organization.capacity();
        self.audit
            .append(
                unit.as_mut(),
                NewAuditRecord::limit_exceeded(
                    organization.id,
                    user_id,
                    active,
                    seat_limit,
                    reason.as_str(),
                    self.ledger.now(),
                ),
            )
            .await?;
        unit.commit().await?;

        info!(
            organization_id = %organization.id,
            user_id = %user_id,
            active,
            seat_limit,
            reason = %reason,
            "Seat allocation rejected"
        );
        Ok(AllocationOutcome::Rejected {
            active,
            seat_limit,
            reason,
        })
    }

    /// Current occupancy of an organization, or `None` if it does not exist.
    pub async fn seat_status(&self, organization_id: OrganizationId) -> AppResult<Option<SeatStatus>> {
        let Some(organization) = self.store.find_organization(organization_id).await? else {
            return Ok(None);
        };
        let active = self.ledger.count_active(organization_id).await?;
        Ok(Some(SeatStatus::new(&organization, active)))
    }
}
