//! Expiry sweeper configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Configuration for the recurring expired-session sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweeper is scheduled at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between two sweeps.
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
    /// Run one sweep immediately on startup.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl SweeperConfig {
    /// Sweep period as a std duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.enabled && self.interval_minutes == 0 {
            return Err(AppError::configuration(
                "sweeper.interval_minutes must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_interval(),
            run_on_startup: true,
        }
    }
}

fn default_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}
