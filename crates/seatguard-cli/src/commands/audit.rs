//! Audit trail command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use seatguard_auth::audit::DEFAULT_QUERY_LIMIT;
use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the audit command
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Organization id or name
    pub organization: String,
    /// Number of records (clamped to 1..=1000)
    #[arg(short, long, default_value_t = DEFAULT_QUERY_LIMIT)]
    pub limit: u32,
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Sequence
    seq: i64,
    /// Time
    time: String,
    /// Action
    action: String,
    /// User
    user_id: String,
    /// Session
    session_id: String,
    /// Details
    details: String,
}

/// Execute `audit`
pub async fn execute(
    args: &AuditArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;
    let organization =
        super::resolve_organization(engine.store.as_ref(), &args.organization).await?;

    let records = engine.audit.query(organization.id, args.limit).await?;
    let rows: Vec<AuditRow> = records
        .iter()
        .map(|r| AuditRow {
            seq: r.sequence,
            time: r.created_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            action: r.action.to_string(),
            user_id: r.user_id.map(|id| id.to_string()).unwrap_or_default(),
            session_id: r.session_id.map(|id| id.to_string()).unwrap_or_default(),
            details: r.details.to_string(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
