//! PostgreSQL-backed seat store.

mod unit;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use seatguard_core::result::AppResult;
use seatguard_core::types::{OrganizationId, UserId};
use seatguard_entity::audit::{AuditRecord, AuditSummary};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::session::Session;
use seatguard_entity::user::{NewUser, User};

use crate::connection::DatabasePool;
use crate::repositories::{
    AuditRepository, OrganizationRepository, SessionRepository, UserRepository, store_error,
};
use crate::store::{SeatStore, SeatUnit};

use self::unit::PgSeatUnit;

/// Seat store on PostgreSQL.
///
/// A unit of work is a transaction that starts by locking the organization
/// row (`SELECT ... FOR UPDATE`). Every allocation, logout and sweep batch of
/// the same organization therefore runs one after the other, and each
/// statement under READ COMMITTED sees the rows committed by the previous
/// holder of the lock.
#[derive(Debug, Clone)]
pub struct PgSeatStore {
    db: DatabasePool,
}

impl PgSeatStore {
    /// Create a store on an existing pool.
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    /// The connection pool.
    pub fn database(&self) -> &DatabasePool {
        &self.db
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn begin(&self, organization_id: OrganizationId) -> AppResult<Box<dyn SeatUnit>> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(store_error("Failed to begin transaction"))?;

        let organization = OrganizationRepository::lock(&mut *tx, organization_id).await?;
        debug!(
            organization_id = %organization_id,
            found = organization.is_some(),
            "Seat unit opened"
        );

        Ok(Box::new(PgSeatUnit::new(tx, organization_id, organization)))
    }

    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        OrganizationRepository::find_by_id(self.db.pool(), id).await
    }

    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        OrganizationRepository::list(self.db.pool()).await
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(self.db.pool(), id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_username(self.db.pool(), username).await
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        SessionRepository::find_by_token_hash(self.db.pool(), token_hash).await
    }

    async fn touch_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool> {
        SessionRepository::touch(self.db.pool(), token_hash, now, cutoff).await
    }

    async fn count_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        SessionRepository::count_active(self.db.pool(), organization_id, cutoff).await
    }

    async fn list_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        SessionRepository::list_active(self.db.pool(), organization_id, cutoff).await
    }

    async fn count_stored_sessions(&self, organization_id: OrganizationId) -> AppResult<u32> {
        SessionRepository::count_stored(self.db.pool(), organization_id).await
    }

    async fn organizations_with_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<OrganizationId>> {
        SessionRepository::organizations_with_expired(self.db.pool(), cutoff).await
    }

    async fn recent_audit(
        &self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> AppResult<Vec<AuditRecord>> {
        AuditRepository::recent(self.db.pool(), organization_id, limit).await
    }

    async fn summarize_audit(&self, organization_id: OrganizationId) -> AppResult<AuditSummary> {
        AuditRepository::summarize(self.db.pool(), organization_id).await
    }

    async fn insert_organization(&self, new: NewOrganization) -> AppResult<Organization> {
        OrganizationRepository::insert(self.db.pool(), &new).await
    }

    async fn insert_user(&self, new: NewUser) -> AppResult<User> {
        UserRepository::insert(self.db.pool(), &new).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.db.pool())
            .await
            .map(|v| v == 1)
            .map_err(store_error("Health check failed"))
    }
}
