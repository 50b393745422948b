//! The inactivity window that decides whether a session still holds a seat.
//!
//! Every component that asks "is this session active?" goes through
//! [`ActivityWindow`], so the admission count and the expiry sweep can never
//! disagree about a session sitting exactly on the boundary.

use chrono::{DateTime, Duration, Utc};

/// Default inactivity timeout in minutes.
pub const DEFAULT_INACTIVITY_MINUTES: u64 = 30;

/// Sliding inactivity window.
///
/// A session is active iff `last_activity > now - timeout`. A session whose
/// last activity is exactly `now - timeout` is expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    timeout: Duration,
}

impl ActivityWindow {
    /// Window with the given timeout.
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Window with a timeout expressed in whole minutes.
    pub fn from_minutes(minutes: u64) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX / 60_000);
        Self::new(Duration::try_minutes(minutes).unwrap_or(Duration::MAX))
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Latest `last_activity` value that counts as expired at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.timeout)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether a session last seen at `last_activity` still holds a seat.
    pub fn is_active(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        last_activity > self.cutoff(now)
    }

    /// Whether a session last seen at `last_activity` is eligible for the sweep.
    pub fn is_expired(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.is_active(last_activity, now)
    }
}

impl Default for ActivityWindow {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_INACTIVITY_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_counts_as_expired() {
        let window = ActivityWindow::default();
        let now = Utc::now();
        let at_cutoff = now - Duration::minutes(30);

        assert!(window.is_expired(at_cutoff, now));
        assert!(window.is_active(at_cutoff + Duration::microseconds(1), now));
    }

    #[test]
    fn test_29_vs_45_minutes() {
        let window = ActivityWindow::default();
        let now = Utc::now();

        assert!(window.is_active(now - Duration::minutes(29), now));
        assert!(window.is_expired(now - Duration::minutes(45), now));
    }

    #[test]
    fn test_cutoff_saturates() {
        let window = ActivityWindow::new(Duration::MAX);
        assert_eq!(window.cutoff(Utc::now()), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_future_activity_is_active() {
        let window = ActivityWindow::default();
        let now = Utc::now();
        assert!(window.is_active(now + Duration::seconds(5), now));
    }
}
