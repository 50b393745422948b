//! Audit/ledger reconciliation command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Organization id or name
    pub organization: String,
}

/// Reconciliation display row
#[derive(Debug, Serialize, Tabled)]
struct ReconcileRow {
    /// Allocated
    allocated: u64,
    /// Deallocated
    deallocated: u64,
    /// Rejected
    limit_exceeded: u64,
    /// Net
    net_allocated: i64,
    /// Stored
    stored_sessions: u32,
    /// Active
    active_sessions: u32,
    /// Awaiting sweep
    awaiting_sweep: u32,
    /// Drift
    drift: i64,
}

/// Execute `reconcile`
pub async fn execute(
    args: &ReconcileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;
    let organization =
        super::resolve_organization(engine.store.as_ref(), &args.organization).await?;

    let report = engine.reconciler.reconcile(organization.id).await?;
    output::print_item(
        &ReconcileRow {
            allocated: report.audit.allocated,
            deallocated: report.audit.deallocated,
            limit_exceeded: report.audit.limit_exceeded,
            net_allocated: report.net_allocated,
            stored_sessions: report.stored_sessions,
            active_sessions: report.active_sessions,
            awaiting_sweep: report.awaiting_sweep,
            drift: report.drift,
        },
        format,
    );

    if report.is_consistent() {
        output::print_success(&format!("'{}' is consistent", organization.name));
    } else {
        output::print_warning(&format!(
            "'{}' audit trail and sessions differ by {}",
            organization.name, report.drift
        ));
    }
    Ok(())
}
