//! Background tasks for SeatGuard.
//!
//! This crate provides:
//! - [`SessionSweepJob`], one guarded run of the expiry sweeper
//! - [`SweepScheduler`], which drives that job on a fixed period with
//!   `tokio-cron-scheduler`

pub mod jobs;
pub mod scheduler;

pub use jobs::SessionSweepJob;
pub use scheduler::SweepScheduler;
