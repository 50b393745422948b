//! Transaction-backed unit of work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use seatguard_core::result::AppResult;
use seatguard_core::types::{OrganizationId, UserId};
use seatguard_entity::audit::{AuditRecord, NewAuditRecord};
use seatguard_entity::organization::Organization;
use seatguard_entity::session::{NewSession, Session};
use seatguard_entity::user::User;

use crate::repositories::{AuditRepository, SessionRepository, UserRepository, store_error};
use crate::store::SeatUnit;

/// An open transaction holding the organization row lock.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub(super) struct PgSeatUnit {
    tx: Transaction<'static, Postgres>,
    organization_id: OrganizationId,
    organization: Option<Organization>,
}

impl PgSeatUnit {
    pub(super) fn new(
        tx: Transaction<'static, Postgres>,
        organization_id: OrganizationId,
        organization: Option<Organization>,
    ) -> Self {
        Self {
            tx,
            organization_id,
            organization,
        }
    }
}

#[async_trait]
impl SeatUnit for PgSeatUnit {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&mut *self.tx, user_id).await
    }

    async fn count_active(&mut self, cutoff: DateTime<Utc>) -> AppResult<u32> {
        SessionRepository::count_active(&mut *self.tx, self.organization_id, cutoff).await
    }

    async fn count_active_for_user(
        &mut self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        SessionRepository::count_active_for_user(&mut *self.tx, user_id, cutoff).await
    }

    async fn insert_session(&mut self, new: NewSession) -> AppResult<Session> {
        SessionRepository::insert(&mut *self.tx, new).await
    }

    async fn delete_session_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> AppResult<Option<Session>> {
        SessionRepository::delete_by_token_hash(&mut *self.tx, self.organization_id, token_hash)
            .await
    }

    async fn delete_expired(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<Session>> {
        SessionRepository::delete_expired(&mut *self.tx, self.organization_id, cutoff).await
    }

    async fn append_audit(&mut self, record: NewAuditRecord) -> AppResult<AuditRecord> {
        AuditRepository::insert(&mut *self.tx, &record).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let unit = *self;
        unit.tx
            .commit()
            .await
            .map_err(store_error("Failed to commit seat unit"))
    }
}
