//! In-process seat store.
//!
//! Suitable for single-process deployments, development and tests. Every
//! organization gets its own async mutex; a unit of work holds it from
//! `begin` until commit or drop, so concurrent allocations for the same
//! organization are serialized while other organizations proceed in parallel.
//! Writes made through a unit are staged and applied in one step on commit.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use seatguard_core::error::AppError;
use seatguard_core::result::AppResult;
use seatguard_core::types::{AuditRecordId, OrganizationId, SessionId, UserId};
use seatguard_entity::audit::{AuditRecord, AuditSummary, NewAuditRecord};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::session::{NewSession, Session};
use seatguard_entity::user::{NewUser, User};

use crate::store::{SeatStore, SeatUnit};

/// Committed rows.
#[derive(Debug, Default)]
struct Tables {
    organizations: HashMap<OrganizationId, Organization>,
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, Session>,
    /// `token_hash` to session id; kept in step with `sessions`.
    tokens: HashMap<String, SessionId>,
    audit: Vec<AuditRecord>,
}

impl Tables {
    fn organization_of(&self, user_id: UserId) -> Option<OrganizationId> {
        self.users.get(&user_id).map(|u| u.organization_id)
    }

    fn session_by_token(&self, token_hash: &str) -> Option<&Session> {
        self.tokens
            .get(token_hash)
            .and_then(|id| self.sessions.get(id))
    }

    fn session_by_token_mut(&mut self, token_hash: &str) -> Option<&mut Session> {
        let id = self.tokens.get(token_hash)?;
        self.sessions.get_mut(id)
    }

    fn put_session(&mut self, session: Session) {
        self.tokens.insert(session.token_hash.clone(), session.id);
        self.sessions.insert(session.id, session);
    }

    fn remove_session(&mut self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        self.tokens.remove(&session.token_hash);
        Some(session)
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    locks: DashMap<OrganizationId, Arc<Mutex<()>>>,
    sequence: AtomicI64,
    #[cfg(any(test, feature = "test-util"))]
    faults: faults::Faults,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_for(&self, organization_id: OrganizationId) -> Arc<Mutex<()>> {
        self.locks
            .entry(organization_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Seat store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySeatStore {
    shared: Arc<Shared>,
}

impl MemorySeatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn begin(&self, organization_id: OrganizationId) -> AppResult<Box<dyn SeatUnit>> {
        #[cfg(any(test, feature = "test-util"))]
        self.shared.faults.check_begin()?;

        let guard = self.shared.lock_for(organization_id).lock_owned().await;
        let organization = self
            .shared
            .read()
            .organizations
            .get(&organization_id)
            .cloned();

        debug!(
            organization_id = %organization_id,
            found = organization.is_some(),
            "Seat unit opened"
        );

        Ok(Box::new(MemorySeatUnit {
            shared: Arc::clone(&self.shared),
            _guard: guard,
            organization_id,
            organization,
            inserted: Vec::new(),
            deleted: HashSet::new(),
            audit: Vec::new(),
        }))
    }

    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        Ok(self.shared.read().organizations.get(&id).cloned())
    }

    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let mut organizations: Vec<_> =
            self.shared.read().organizations.values().cloned().collect();
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organizations)
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.shared.read().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .shared
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        Ok(self.shared.read().session_by_token(token_hash).cloned())
    }

    async fn touch_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(organization_id) = self
            .shared
            .read()
            .session_by_token(token_hash)
            .map(|s| s.organization_id)
        else {
            return Ok(false);
        };

        // Wait out any open unit so a sweep that already decided to reclaim
        // this session is not followed by a refresh of a deleted row.
        let _guard = self.shared.lock_for(organization_id).lock_owned().await;
        let mut tables = self.shared.write();
        let Some(session) = tables.session_by_token_mut(token_hash) else {
            return Ok(false);
        };
        if session.last_activity <= cutoff {
            return Ok(false);
        }
        session.last_activity = session.last_activity.max(now);
        Ok(true)
    }

    async fn count_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        let tables = self.shared.read();
        let count = tables
            .sessions
            .values()
            .filter(|s| s.organization_id == organization_id && s.last_activity > cutoff)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_active(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let mut sessions: Vec<_> = self
            .shared
            .read()
            .sessions
            .values()
            .filter(|s| s.organization_id == organization_id && s.last_activity > cutoff)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn count_stored_sessions(&self, organization_id: OrganizationId) -> AppResult<u32> {
        let count = self
            .shared
            .read()
            .sessions
            .values()
            .filter(|s| s.organization_id == organization_id)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn organizations_with_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<OrganizationId>> {
        let mut ids: Vec<_> = self
            .shared
            .read()
            .sessions
            .values()
            .filter(|s| s.last_activity <= cutoff)
            .map(|s| s.organization_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn recent_audit(
        &self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> AppResult<Vec<AuditRecord>> {
        let tables = self.shared.read();
        let mut records: Vec<_> = tables
            .audit
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn summarize_audit(&self, organization_id: OrganizationId) -> AppResult<AuditSummary> {
        let tables = self.shared.read();
        let mut summary = AuditSummary::default();
        for record in tables
            .audit
            .iter()
            .filter(|r| r.organization_id == organization_id)
        {
            summary.record(record.action);
        }
        Ok(summary)
    }

    async fn insert_organization(&self, new: NewOrganization) -> AppResult<Organization> {
        if new.seat_limit < 0 {
            return Err(AppError::validation("seat_limit must not be negative"));
        }
        let mut tables = self.shared.write();
        if tables.organizations.values().any(|o| o.name == new.name) {
            return Err(AppError::conflict(format!(
                "Organization '{}' already exists",
                new.name
            )));
        }
        let organization = Organization {
            id: OrganizationId::new(),
            name: new.name,
            seat_limit: new.seat_limit,
            created_at: Utc::now(),
        };
        tables
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn insert_user(&self, new: NewUser) -> AppResult<User> {
        let mut tables = self.shared.write();
        if !tables.organizations.contains_key(&new.organization_id) {
            return Err(AppError::not_found(format!(
                "Organization {} not found",
                new.organization_id
            )));
        }
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(AppError::conflict(format!(
                "User '{}' already exists",
                new.username
            )));
        }
        let user = User {
            id: UserId::new(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            organization_id: new.organization_id,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Unit of work over [`MemorySeatStore`].
///
/// Reads see committed rows overlaid with this unit's own staged writes.
struct MemorySeatUnit {
    shared: Arc<Shared>,
    _guard: OwnedMutexGuard<()>,
    organization_id: OrganizationId,
    organization: Option<Organization>,
    inserted: Vec<Session>,
    deleted: HashSet<SessionId>,
    audit: Vec<AuditRecord>,
}

impl MemorySeatUnit {
    /// Sessions of the locked organization as this unit sees them.
    fn visible_sessions(&self, tables: &Tables) -> Vec<Session> {
        tables
            .sessions
            .values()
            .filter(|s| s.organization_id == self.organization_id && !self.deleted.contains(&s.id))
            .chain(self.inserted.iter())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SeatUnit for MemorySeatUnit {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.shared.read().users.get(&user_id).cloned())
    }

    async fn count_active(&mut self, cutoff: DateTime<Utc>) -> AppResult<u32> {
        let tables = self.shared.read();
        let count = self
            .visible_sessions(&tables)
            .iter()
            .filter(|s| s.last_activity > cutoff)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn count_active_for_user(
        &mut self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        let tables = self.shared.read();
        let count = self
            .visible_sessions(&tables)
            .iter()
            .filter(|s| s.user_id == user_id && s.last_activity > cutoff)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn insert_session(&mut self, new: NewSession) -> AppResult<Session> {
        {
            let tables = self.shared.read();
            if tables.organization_of(new.user_id) != Some(new.organization_id) {
                return Err(AppError::store(format!(
                    "User {} does not belong to organization {}",
                    new.user_id, new.organization_id
                )));
            }
            let duplicate = tables.sessions.contains_key(&new.id)
                || tables.tokens.contains_key(&new.token_hash)
                || self
                    .inserted
                    .iter()
                    .any(|s| s.id == new.id || s.token_hash == new.token_hash);
            if duplicate {
                return Err(AppError::store("Session id or token already in use"));
            }
        }

        let session = new.into_session();
        self.inserted.push(session.clone());
        Ok(session)
    }

    async fn delete_session_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> AppResult<Option<Session>> {
        if let Some(pos) = self
            .inserted
            .iter()
            .position(|s| s.token_hash == token_hash)
        {
            return Ok(Some(self.inserted.remove(pos)));
        }

        let found = self
            .shared
            .read()
            .session_by_token(token_hash)
            .filter(|s| {
                s.organization_id == self.organization_id && !self.deleted.contains(&s.id)
            })
            .cloned();
        if let Some(session) = &found {
            self.deleted.insert(session.id);
        }
        Ok(found)
    }

    async fn delete_expired(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<Session>> {
        let expired: Vec<Session> = {
            let tables = self.shared.read();
            self.visible_sessions(&tables)
                .into_iter()
                .filter(|s| s.last_activity <= cutoff)
                .collect()
        };

        for session in &expired {
            self.inserted.retain(|s| s.id != session.id);
            self.deleted.insert(session.id);
        }
        Ok(expired)
    }

    async fn append_audit(&mut self, record: NewAuditRecord) -> AppResult<AuditRecord> {
        #[cfg(any(test, feature = "test-util"))]
        self.shared.faults.check_audit(record.action)?;

        let stored = AuditRecord {
            id: AuditRecordId::new(),
            sequence: self.shared.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            organization_id: record.organization_id,
            user_id: record.user_id,
            session_id: record.session_id,
            action: record.action,
            details: record.details,
            created_at: record.created_at,
        };
        self.audit.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let unit = *self;
        let mut tables = unit.shared.write();
        for id in &unit.deleted {
            tables.remove_session(id);
        }
        for session in unit.inserted {
            tables.put_session(session);
        }
        tables.audit.extend(unit.audit);
        debug!(organization_id = %unit.organization_id, "Seat unit committed");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-util"))]
mod faults {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use seatguard_core::error::AppError;
    use seatguard_core::result::AppResult;
    use seatguard_entity::audit::SeatAuditAction;

    /// Failure switches for exercising error paths.
    #[derive(Debug, Default)]
    pub(super) struct Faults {
        pub(super) fail_begin: AtomicBool,
        pub(super) fail_audit: Mutex<Option<SeatAuditAction>>,
        pub(super) fail_all_audit: AtomicBool,
    }

    impl Faults {
        pub(super) fn check_begin(&self) -> AppResult<()> {
            if self.fail_begin.load(Ordering::SeqCst) {
                return Err(AppError::store("injected store failure"));
            }
            Ok(())
        }

        pub(super) fn check_audit(&self, action: SeatAuditAction) -> AppResult<()> {
            let targeted = *self.fail_audit.lock().unwrap_or_else(|e| e.into_inner());
            if self.fail_all_audit.load(Ordering::SeqCst) || targeted == Some(action) {
                return Err(AppError::audit_write(format!(
                    "injected failure writing {action} record"
                )));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl MemorySeatStore {
    /// Make every subsequent `begin` fail with a store error.
    pub fn fail_begin(&self, fail: bool) {
        self.shared
            .faults
            .fail_begin
            .store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent audit append fail.
    pub fn fail_audit_writes(&self, fail: bool) {
        self.shared
            .faults
            .fail_all_audit
            .store(fail, Ordering::SeqCst);
    }

    /// Make audit appends of one action fail; `None` clears it.
    pub fn fail_audit_action(&self, action: Option<seatguard_entity::audit::SeatAuditAction>) {
        *self
            .shared
            .faults
            .fail_audit
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = action;
    }
}
