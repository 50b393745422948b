//! Session activity configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::activity::ActivityWindow;

/// Upper bound for the inactivity timeout (one week).
const MAX_INACTIVITY_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes without activity after which a session stops holding a seat.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_minutes: u64,
    /// Maximum concurrent sessions a single user may hold.
    /// A value of `0` means unlimited (bounded only by the organization's seats).
    #[serde(default)]
    pub max_sessions_per_user: u32,
}

impl SessionConfig {
    /// The activity window derived from this configuration.
    pub fn activity_window(&self) -> ActivityWindow {
        ActivityWindow::from_minutes(self.inactivity_timeout_minutes)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.inactivity_timeout_minutes == 0
            || self.inactivity_timeout_minutes > MAX_INACTIVITY_TIMEOUT_MINUTES
        {
            return Err(AppError::configuration(format!(
                "session.inactivity_timeout_minutes must be between 1 and {MAX_INACTIVITY_TIMEOUT_MINUTES}, got {}",
                self.inactivity_timeout_minutes
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_minutes: default_inactivity_timeout(),
            max_sessions_per_user: 0,
        }
    }
}

fn default_inactivity_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_timeout() {
        let config = SessionConfig {
            inactivity_timeout_minutes: 0,
            max_sessions_per_user: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_matches_timeout() {
        let config = SessionConfig::default();
        assert_eq!(config.activity_window().timeout().num_minutes(), 30);
    }
}
