//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatguard_core::types::OrganizationId;

/// A tenant owning a fixed number of concurrent-session seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Maximum simultaneously active sessions. Never negative.
    pub seat_limit: i32,
    /// When the organization was provisioned.
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// The seat limit as an unsigned capacity.
    pub fn capacity(&self) -> u32 {
        u32::try_from(self.seat_limit).unwrap_or(0)
    }

    /// Whether one more session fits next to `active` live ones.
    pub fn admits(&self, active: u32) -> bool {
        active < self.capacity()
    }

    /// Seats still free given `active` live sessions, floored at zero.
    pub fn available_seats(&self, active: u32) -> u32 {
        self.capacity().saturating_sub(active)
    }
}

/// Data required to provision an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
    /// Display name.
    pub name: String,
    /// Seat limit (must be `>= 0`).
    pub seat_limit: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(seat_limit: i32) -> Organization {
        Organization {
            id: OrganizationId::new(),
            name: "Acme Corp".into(),
            seat_limit,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admission_is_strict() {
        let acme = org(5);
        assert!(acme.admits(4));
        assert!(!acme.admits(5));
        assert!(!acme.admits(6));
    }

    #[test]
    fn test_zero_limit_never_admits() {
        assert!(!org(0).admits(0));
    }

    #[test]
    fn test_available_seats_floor_at_zero() {
        let acme = org(5);
        assert_eq!(acme.available_seats(2), 3);
        assert_eq!(acme.available_seats(7), 0);
        assert_eq!(org(-1).capacity(), 0);
    }
}
