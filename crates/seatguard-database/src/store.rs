//! Store abstraction used by the seat engine.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatguard_core::result::AppResult;
use seatguard_core::types::{OrganizationId, UserId};
use seatguard_entity::audit::{AuditRecord, AuditSummary, NewAuditRecord};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::session::{NewSession, Session};
use seatguard_entity::user::{NewUser, User};

/// Durable store for organizations, users, sessions and the seat audit trail.
///
/// Reads on the store itself see committed data only. Anything that changes
/// the number of sessions an organization holds must go through
/// [`SeatStore::begin`].
#[async_trait]
pub trait SeatStore: Send + Sync + Debug {
    /// Open a unit of work holding the lock for `organization_id`.
    ///
    /// Waits while another unit for the same organization is open. Units for
    /// different organizations never wait on each other.
    async fn begin(&self, organization_id: OrganizationId) -> AppResult<Box<dyn SeatUnit>>;

    /// Look up an organization.
    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>>;

    /// All organizations ordered by name.
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// Look up a user by id.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Look up a user by login name.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Look up a stored session by token digest, active or not.
    async fn find_session_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Set `last_activity = now` if the session is still active (`> cutoff`).
    ///
    /// Returns `false` when no active session matches.
    async fn touch_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Number of sessions of the organization with `last_activity > cutoff`.
    async fn count_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32>;

    /// Sessions of the organization with `last_activity > cutoff`, oldest first.
    async fn list_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Session>>;

    /// Number of stored session rows of the organization, expired or not.
    async fn count_stored_sessions(&self, organization_id: OrganizationId) -> AppResult<u32>;

    /// Organizations that own at least one session with `last_activity <= cutoff`.
    async fn organizations_with_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<OrganizationId>>;

    /// The newest `limit` audit records of the organization, newest first.
    async fn recent_audit(
        &self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> AppResult<Vec<AuditRecord>>;

    /// Per-action audit counts of the organization.
    async fn summarize_audit(&self, organization_id: OrganizationId) -> AppResult<AuditSummary>;

    /// Provision an organization.
    async fn insert_organization(&self, new: NewOrganization) -> AppResult<Organization>;

    /// Provision a user.
    async fn insert_user(&self, new: NewUser) -> AppResult<User>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// A per-organization unit of work.
///
/// Holds the organization's lock until it is committed or dropped. Dropping
/// an uncommitted unit discards every write made through it.
#[async_trait]
pub trait SeatUnit: Send {
    /// The organization this unit is locked on.
    fn organization_id(&self) -> OrganizationId;

    /// The locked organization, or `None` if it does not exist.
    fn organization(&self) -> Option<&Organization>;

    /// Look up a user (any organization).
    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<User>>;

    /// Active sessions of the locked organization.
    async fn count_active(&mut self, cutoff: DateTime<Utc>) -> AppResult<u32>;

    /// Active sessions of one user.
    async fn count_active_for_user(
        &mut self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32>;

    /// Insert a session row.
    async fn insert_session(&mut self, new: NewSession) -> AppResult<Session>;

    /// Delete the organization's session with this token digest.
    async fn delete_session_by_token_hash(&mut self, token_hash: &str)
    -> AppResult<Option<Session>>;

    /// Delete every session of the organization with `last_activity <= cutoff`.
    async fn delete_expired(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<Session>>;

    /// Append an audit record. Failure is reported as `ErrorKind::AuditWrite`.
    async fn append_audit(&mut self, record: NewAuditRecord) -> AppResult<AuditRecord>;

    /// Make every write of this unit durable and release the lock.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
