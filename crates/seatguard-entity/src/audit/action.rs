//! Seat audit action kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What happened to a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatAuditAction {
    /// A session was admitted and took a seat.
    SeatAllocated,
    /// A session was removed (logout or expiry) and gave its seat back.
    SeatDeallocated,
    /// A login attempt was refused because no seat was free.
    SeatLimitExceeded,
}

impl SeatAuditAction {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeatAllocated => "SEAT_ALLOCATED",
            Self::SeatDeallocated => "SEAT_DEALLOCATED",
            Self::SeatLimitExceeded => "SEAT_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for SeatAuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatAuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEAT_ALLOCATED" => Ok(Self::SeatAllocated),
            "SEAT_DEALLOCATED" => Ok(Self::SeatDeallocated),
            "SEAT_LIMIT_EXCEEDED" => Ok(Self::SeatLimitExceeded),
            other => Err(format!("unknown seat audit action: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_stored_names() {
        let json = serde_json::to_string(&SeatAuditAction::SeatLimitExceeded).unwrap();
        assert_eq!(json, "\"SEAT_LIMIT_EXCEEDED\"");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "seat_deallocated".parse::<SeatAuditAction>().unwrap(),
            SeatAuditAction::SeatDeallocated
        );
        assert!("SEAT_STOLEN".parse::<SeatAuditAction>().is_err());
    }
}
