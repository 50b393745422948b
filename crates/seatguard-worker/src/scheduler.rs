//! Periodic scheduling of the session sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use seatguard_core::config::SweeperConfig;
use seatguard_core::error::AppError;

use crate::jobs::SessionSweepJob;

/// Runs [`SessionSweepJob`] every `sweeper.interval_minutes`.
pub struct SweepScheduler {
    scheduler: JobScheduler,
    job: Arc<SessionSweepJob>,
    config: SweeperConfig,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl SweepScheduler {
    /// Create a scheduler and register the sweep job.
    pub async fn new(job: Arc<SessionSweepJob>, config: SweeperConfig) -> Result<Self, AppError> {
        config.validate()?;
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to create scheduler: {e}")))?;

        let this = Self {
            scheduler,
            job,
            config,
        };
        this.register_sweep().await?;
        Ok(this)
    }

    async fn register_sweep(&self) -> Result<(), AppError> {
        let job = Arc::clone(&self.job);
        let interval = self.config.interval();
        let cron_job = CronJob::new_repeated_async(interval, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::trace!("Session sweep tick");
                job.run_logged().await;
            })
        })
        .map_err(|e| AppError::scheduler(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to add sweep schedule: {e}")))?;

        tracing::info!(
            interval_minutes = self.config.interval_minutes,
            "Registered: session_sweep"
        );
        Ok(())
    }

    /// Start ticking. Runs one sweep right away when `run_on_startup` is set.
    pub async fn start(&self) -> Result<(), AppError> {
        if self.config.run_on_startup {
            let job = Arc::clone(&self.job);
            tokio::spawn(async move { job.run_logged().await });
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Sweep scheduler started");
        Ok(())
    }

    /// Stop ticking. An in-flight sweep finishes its current batch.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to shut down scheduler: {e}")))?;

        tracing::info!("Sweep scheduler shut down");
        Ok(())
    }
}
