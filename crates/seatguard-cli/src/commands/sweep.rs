//! Manual expired-session sweep.

use serde::Serialize;
use tabled::Tabled;

use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Sweep result display row
#[derive(Debug, Serialize, Tabled)]
struct SweepRow {
    /// Organizations
    organizations_swept: u32,
    /// Reclaimed
    sessions_reclaimed: u32,
    /// Failed
    failed_batches: usize,
}

/// Execute `sweep`
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;
    let report = engine.sweeper.sweep_once().await?;

    output::print_item(
        &SweepRow {
            organizations_swept: report.organizations_swept,
            sessions_reclaimed: report.sessions_reclaimed,
            failed_batches: report.failed_batches.len(),
        },
        format,
    );

    for organization_id in &report.failed_batches {
        output::print_warning(&format!(
            "Batch for organization {organization_id} failed and will be retried on the next sweep"
        ));
    }
    Ok(())
}
