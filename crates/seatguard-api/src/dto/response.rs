//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatguard_core::types::{OrganizationId, SessionId, UserId};
use seatguard_entity::session::Session;
use seatguard_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token. Shown once; only its digest is stored.
    pub token: String,
    /// Id of the new session.
    pub session_id: SessionId,
    /// The authenticated user.
    pub user: UserSummary,
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Organization the user belongs to.
    pub organization_id: OrganizationId,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            organization_id: user.organization_id,
        }
    }
}

/// Logout response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Whether a session was actually removed.
    pub released: bool,
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Always `true`; inactive sessions get a 401 instead.
    pub active: bool,
}

/// An active session as listed to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSessionResponse {
    /// Session ID.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// Last heartbeat.
    pub last_activity: DateTime<Utc>,
    /// Seconds since the last heartbeat.
    pub idle_seconds: i64,
}

impl ActiveSessionResponse {
    /// Build from a session as seen at `now`.
    pub fn from_session(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            created_at: session.created_at,
            last_activity: session.last_activity,
            idle_seconds: session.idle_for(now).num_seconds(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Store backend in use.
    pub store: String,
    /// Whether the store answered.
    pub store_reachable: bool,
}
