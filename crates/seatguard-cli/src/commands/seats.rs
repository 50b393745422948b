//! Seat occupancy commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for seat commands
#[derive(Debug, Args)]
pub struct SeatsArgs {
    /// Seats subcommand
    #[command(subcommand)]
    pub command: SeatsCommand,
}

/// Seats subcommands
#[derive(Debug, Subcommand)]
pub enum SeatsCommand {
    /// Show limit, active and available seats
    Status {
        /// Organization id or name
        organization: String,
    },
    /// List the sessions currently holding a seat
    Sessions {
        /// Organization id or name
        organization: String,
    },
}

/// Seat status display row
#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    /// Organization
    organization: String,
    /// Seat limit
    seat_limit: u32,
    /// Active
    active: u32,
    /// Available
    available: u32,
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    id: String,
    /// User ID
    user_id: String,
    /// Created
    created_at: String,
    /// Last Activity
    last_activity: String,
    /// Idle
    idle_minutes: i64,
}

/// Execute seat commands
pub async fn execute(
    args: &SeatsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;

    match &args.command {
        SeatsCommand::Status { organization } => {
            let organization =
                super::resolve_organization(engine.store.as_ref(), organization).await?;
            let status = engine
                .allocator
                .seat_status(organization.id)
                .await?
                .ok_or_else(|| AppError::not_found("Organization was removed"))?;

            output::print_item(
                &StatusRow {
                    organization: status.organization,
                    seat_limit: status.seat_limit,
                    active: status.active_seats,
                    available: status.available_seats,
                },
                format,
            );
        }
        SeatsCommand::Sessions { organization } => {
            let organization =
                super::resolve_organization(engine.store.as_ref(), organization).await?;
            let now = Utc::now();
            let rows: Vec<SessionRow> = engine
                .ledger
                .list_active(organization.id)
                .await?
                .iter()
                .map(|s| SessionRow {
                    id: s.id.to_string(),
                    user_id: s.user_id.to_string(),
                    created_at: s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    last_activity: s.last_activity.format("%Y-%m-%d %H:%M:%S").to_string(),
                    idle_minutes: s.idle_for(now).num_minutes(),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    Ok(())
}
