//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatguard_core::types::{ActivityWindow, OrganizationId, SessionId, UserId};

/// A seat-holding session.
///
/// The row lives in `active_sessions`; `organization_id` is joined in from the
/// owning user so callers never need a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier. Never reused.
    pub id: SessionId,
    /// The user holding this session.
    pub user_id: UserId,
    /// The organization whose seat the session occupies.
    pub organization_id: OrganizationId,
    /// SHA-256 hex digest of the session token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// When the session was admitted.
    pub created_at: DateTime<Utc>,
    /// Last heartbeat or admission time.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Whether the session still holds a seat at `now`.
    pub fn is_active(&self, window: &ActivityWindow, now: DateTime<Utc>) -> bool {
        window.is_active(self.last_activity, now)
    }

    /// How long the session has been idle at `now`.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_activity).max(Duration::zero())
    }
}

/// Data required to insert a session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Pre-generated session id.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Owning organization (must match the user's).
    pub organization_id: OrganizationId,
    /// SHA-256 hex digest of the issued token.
    pub token_hash: String,
    /// Admission instant, also the initial `last_activity`.
    pub created_at: DateTime<Utc>,
}

impl NewSession {
    /// The session row as it will be stored.
    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            organization_id: self.organization_id,
            token_hash: self.token_hash,
            created_at: self.created_at,
            last_activity: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_active() {
        let now = Utc::now();
        let session = NewSession {
            id: SessionId::new(),
            user_id: UserId::new(),
            organization_id: OrganizationId::new(),
            token_hash: "abc".into(),
            created_at: now,
        }
        .into_session();

        assert_eq!(session.last_activity, session.created_at);
        assert!(session.is_active(&ActivityWindow::default(), now));
        assert!(!session.is_active(&ActivityWindow::default(), now + Duration::minutes(30)));
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let session = NewSession {
            id: SessionId::new(),
            user_id: UserId::new(),
            organization_id: OrganizationId::new(),
            token_hash: "secret-digest".into(),
            created_at: Utc::now(),
        }
        .into_session();

        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-digest"));
    }
}
