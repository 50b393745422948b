//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatguard_core::types::{OrganizationId, UserId};

/// A user account. Belongs to exactly one organization for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The organization whose seats this user consumes.
    pub organization_id: OrganizationId,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user belongs to `organization_id`.
    pub fn belongs_to(&self, organization_id: OrganizationId) -> bool {
        self.organization_id == organization_id
    }
}

/// Data required to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: Option<String>,
    /// Pre-computed Argon2 hash.
    pub password_hash: String,
    /// Owning organization.
    pub organization_id: OrganizationId,
}
