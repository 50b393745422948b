//! Session repository.
//!
//! `active_sessions` has no organization column; the organization is always
//! joined in through `users`.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use seatguard_core::result::AppResult;
use seatguard_core::types::{OrganizationId, UserId};
use seatguard_entity::session::{NewSession, Session};

use super::{store_error, to_count};

const SESSION_SELECT: &str = "SELECT s.id, s.user_id, u.organization_id, s.token_hash, \
     s.created_at, s.last_activity \
     FROM active_sessions s JOIN users u ON u.id = s.user_id";

const SESSION_RETURNING: &str = "RETURNING s.id, s.user_id, u.organization_id, s.token_hash, \
     s.created_at, s.last_activity";

/// Queries against `active_sessions`.
#[derive(Debug, Clone, Copy)]
pub struct SessionRepository;

impl SessionRepository {
    /// Insert a new session row.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        new: NewSession,
    ) -> AppResult<Session> {
        sqlx::query(
            "INSERT INTO active_sessions (id, user_id, token_hash, created_at, last_activity) \
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(&new.token_hash)
        .bind(new.created_at)
        .execute(executor)
        .await
        .map_err(store_error("Failed to insert session"))?;

        Ok(new.into_session())
    }

    /// Find a session by token digest.
    pub async fn find_by_token_hash<'e, E: PgExecutor<'e>>(
        executor: E,
        token_hash: &str,
    ) -> AppResult<Option<Session>> {
        let sql = format!("{SESSION_SELECT} WHERE s.token_hash = $1");
        sqlx::query_as::<_, Session>(&sql)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
            .map_err(store_error("Failed to find session by token"))
    }

    /// Count active sessions of an organization.
    pub async fn count_active<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM active_sessions s JOIN users u ON u.id = s.user_id \
             WHERE u.organization_id = $1 AND s.last_activity > $2",
        )
        .bind(organization_id)
        .bind(cutoff)
        .fetch_one(executor)
        .await
        .map_err(store_error("Failed to count active sessions"))?;
        Ok(to_count(count))
    }

    /// Count active sessions of one user.
    pub async fn count_active_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM active_sessions WHERE user_id = $1 AND last_activity > $2",
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_one(executor)
        .await
        .map_err(store_error("Failed to count user sessions"))?;
        Ok(to_count(count))
    }

    /// Count every stored session of an organization, expired or not.
    pub async fn count_stored<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
    ) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM active_sessions s JOIN users u ON u.id = s.user_id \
             WHERE u.organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(executor)
        .await
        .map_err(store_error("Failed to count stored sessions"))?;
        Ok(to_count(count))
    }

    /// List active sessions of an organization, oldest first.
    pub async fn list_active<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let sql = format!(
            "{SESSION_SELECT} WHERE u.organization_id = $1 AND s.last_activity > $2 \
             ORDER BY s.created_at, s.id"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(organization_id)
            .bind(cutoff)
            .fetch_all(executor)
            .await
            .map_err(store_error("Failed to list active sessions"))
    }

    /// Refresh `last_activity` of a still-active session.
    pub async fn touch<'e, E: PgExecutor<'e>>(
        executor: E,
        token_hash: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE active_sessions SET last_activity = GREATEST(last_activity, $2) \
             WHERE token_hash = $1 AND last_activity > $3",
        )
        .bind(token_hash)
        .bind(now)
        .bind(cutoff)
        .execute(executor)
        .await
        .map_err(store_error("Failed to touch session"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the organization's session with this token digest.
    pub async fn delete_by_token_hash<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
        token_hash: &str,
    ) -> AppResult<Option<Session>> {
        let sql = format!(
            "DELETE FROM active_sessions s USING users u \
             WHERE u.id = s.user_id AND u.organization_id = $1 AND s.token_hash = $2 \
             {SESSION_RETURNING}"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(organization_id)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
            .map_err(store_error("Failed to delete session"))
    }

    /// Delete every expired session of an organization.
    pub async fn delete_expired<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let sql = format!(
            "DELETE FROM active_sessions s USING users u \
             WHERE u.id = s.user_id AND u.organization_id = $1 AND s.last_activity <= $2 \
             {SESSION_RETURNING}"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(organization_id)
            .bind(cutoff)
            .fetch_all(executor)
            .await
            .map_err(store_error("Failed to delete expired sessions"))
    }

    /// Organizations owning at least one expired session.
    pub async fn organizations_with_expired<'e, E: PgExecutor<'e>>(
        executor: E,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<OrganizationId>> {
        sqlx::query_scalar::<_, OrganizationId>(
            "SELECT DISTINCT u.organization_id FROM active_sessions s \
             JOIN users u ON u.id = s.user_id WHERE s.last_activity <= $1",
        )
        .bind(cutoff)
        .fetch_all(executor)
        .await
        .map_err(store_error("Failed to find organizations with expired sessions"))
    }
}
