//! The session ledger.
//!
//! Owns the set of sessions holding seats. It never checks seat limits:
//! creation is only reachable with a unit of work already opened by the
//! allocator, and it is the allocator that decides admission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use seatguard_core::result::AppResult;
use seatguard_core::types::{ActivityWindow, Clock, OrganizationId, SessionId, UserId};
use seatguard_database::{SeatStore, SeatUnit};
use seatguard_entity::audit::NewAuditRecord;
use seatguard_entity::audit::model::REASON_LOGOUT;
use seatguard_entity::session::{NewSession, Session, SessionToken};

use crate::audit::AuditTrail;

/// Creates, refreshes, counts and destroys sessions.
#[derive(Debug, Clone)]
pub struct SessionLedger {
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
    window: ActivityWindow,
    audit: AuditTrail,
}

impl SessionLedger {
    /// Create a ledger.
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

    /// The activity window every count and sweep uses.
    pub fn window(&self) -> ActivityWindow {
        self.window
    }

    /// The current instant according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Insert a new session for `user_id` inside `unit`.
    ///
    /// The raw token is returned once; only its digest is stored.
    pub async fn create(
        &self,
        unit: &mut dyn SeatUnit,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<(SessionToken, Session)> {
        let token = SessionToken::generate();
        let organization_id = unit.organization_id();
        let session = unit
            .insert_session(NewSession {
                id: SessionId::new(),
                user_id,
                organization_id,
                token_hash: token.hash(),
                created_at: now,
            })
            .await?;

        debug!(
            session_id = %session.id,
            user_id = %user_id,
            organization_id = %session.organization_id,
            "Session created"
        );
        Ok((token, session))
    }

    /// Remove the session identified by `token` and release its seat.
    ///
    /// Returns `false` without writing anything if no such session exists.
    pub async fn destroy(&self, token: &SessionToken) -> AppResult<bool> {
        let token_hash = token.hash();
        let Some(found) = self.store.find_session_by_token_hash(&token_hash).await? else {
            return Ok(false);
        };

        let mut unit = self.store.begin(found.organization_id).await?;
        // A concurrent logout or sweep may have removed it while we waited.
        let Some(session) = unit.delete_session_by_token_hash(&token_hash).await? else {
            return Ok(false);
        };

        let now = self.clock.now();
        self.audit
            .append(
                unit.as_mut(),
                NewAuditRecord::deallocated(
                    session.organization_id,
                    session.user_id,
                    session.id,
                    REASON_LOGOUT,
                    now,
                ),
            )
            .await?;
        unit.commit().await?;

        info!(
            session_id = %session.id,
            user_id = %session.user_id,
            organization_id = %session.organization_id,
            "Session destroyed, seat released"
        );
        Ok(true)
    }

    /// Record activity on the session identified by `token`.
    ///
    /// Returns `false` if the token does not identify an active session;
    /// expired sessions cannot be revived.
    pub async fn touch(&self, token: &SessionToken) -> AppResult<bool> {
        let now = self.clock.now();
        let touched = self
            .store
            .touch_session(&token.hash(), now, self.window.cutoff(now))
            .await?;
        debug!(touched, "Session heartbeat");
        Ok(touched)
    }

    /// The active session identified by `token`, if any.
    pub async fn resolve(&self, token: &SessionToken) -> AppResult<Option<Session>> {
        let now = self.clock.now();
        let session = self.store.find_session_by_token_hash(&token.hash()).await?;
        Ok(session.filter(|s| s.is_active(&self.window, now)))
    }

    /// Number of active sessions of an organization.
    pub async fn count_active(&self, organization_id: OrganizationId) -> AppResult<u32> {
        let cutoff = self.window.cutoff(self.clock.now());
        self.store.count_active(organization_id, cutoff).await
    }

    /// Active sessions of an organization, oldest first.
    pub async fn list_active(&self, organization_id: OrganizationId) -> AppResult<Vec<Session>> {
        let cutoff = self.window.cutoff(self.clock.now());
        self.store.list_active(organization_id, cutoff).await
    }
}
