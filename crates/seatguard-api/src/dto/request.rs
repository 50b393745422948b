//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of requests that act on a session token (logout, heartbeat).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    /// The session token returned by login.
    #[validate(length(min = 1, max = 512, message = "Token is required"))]
    pub token: String,
}

/// Query parameters of the audit trail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Maximum records to return (default 100, clamped to 1..=1000).
    #[serde(default = "default_audit_limit")]
    pub limit: u32,
}

fn default_audit_limit() -> u32 {
    seatguard_auth::audit::DEFAULT_QUERY_LIMIT
}
