//! Expired-session sweep job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use seatguard_auth::{SessionSweeper, SweepReport};
use seatguard_core::result::AppResult;

/// One run of the expiry sweeper.
///
/// Overlapping runs are skipped rather than queued: a slow sweep is
/// followed by the next scheduled tick, not by a pile-up.
#[derive(Debug)]
pub struct SessionSweepJob {
    sweeper: Arc<SessionSweeper>,
    running: AtomicBool,
}

impl SessionSweepJob {
    /// Create a job over `sweeper`.
    pub fn new(sweeper: Arc<SessionSweeper>) -> Self {
        Self {
            sweeper,
            running: AtomicBool::new(false),
        }
    }

    /// Sweep once. Returns `Ok(None)` if a previous run is still in progress.
    pub async fn run(&self) -> AppResult<Option<SweepReport>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Session sweep already running, skipping tick");
            return Ok(None);
        }

        let _running = RunningGuard(&self.running);
        self.sweeper.sweep_once().await.map(Some)
    }

    /// Sweep once and log the outcome. Never fails.
    pub async fn run_logged(&self) {
        match self.run().await {
            Ok(Some(report)) => {
                tracing::debug!(
                    reclaimed = report.sessions_reclaimed,
                    organizations = report.organizations_swept,
                    failed_batches = report.failed_batches.len(),
                    "Session sweep finished"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Session sweep failed, retrying on next tick");
            }
        }
    }
}

/// Clears the running flag however the run ends, including a panic or
/// the run's future being dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
