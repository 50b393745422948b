//! CLI command definitions and dispatch.

pub mod audit;
pub mod migrate;
pub mod reconcile;
pub mod seats;
pub mod seed;
pub mod sweep;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use seatguard_auth::SeatEngine;
use seatguard_core::config::{AppConfig, StoreBackend};
use seatguard_core::error::AppError;
use seatguard_core::types::{OrganizationId, SystemClock};
use seatguard_database::{DatabasePool, PgSeatStore, SeatStore};
use seatguard_entity::organization::Organization;

/// SeatGuard: per-organization session seat enforcement
#[derive(Debug, Parser)]
#[command(name = "seatguard", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load (config/<env>.toml)
    #[arg(short, long, default_value = "production")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Provision development organizations and users
    Seed(seed::SeedArgs),
    /// Seat occupancy reports
    Seats(seats::SeatsArgs),
    /// Show the newest audit records of an organization
    Audit(audit::AuditArgs),
    /// Compare the audit trail with the stored sessions
    Reconcile(reconcile::ReconcileArgs),
    /// Run one expired-session sweep now
    Sweep,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;

        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Seed(args) => seed::execute(args, &config).await,
            Commands::Seats(args) => seats::execute(args, &config, self.format).await,
            Commands::Audit(args) => audit::execute(args, &config, self.format).await,
            Commands::Reconcile(args) => reconcile::execute(args, &config, self.format).await,
            Commands::Sweep => sweep::execute(&config, self.format).await,
        }
    }
}

/// Helper: connect to PostgreSQL.
///
/// The in-memory backend lives inside the server process, so the CLI
/// cannot operate on it.
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    if config.store.backend != StoreBackend::Postgres {
        return Err(AppError::configuration(format!(
            "The CLI needs the postgres store backend, configuration selects '{}'",
            config.store.backend
        )));
    }
    DatabasePool::connect(&config.database).await
}

/// Helper: connect and wire a seat engine over the PostgreSQL store.
pub async fn connect_engine(config: &AppConfig) -> Result<SeatEngine, AppError> {
    let store: Arc<dyn SeatStore> = Arc::new(PgSeatStore::new(connect(config).await?));
    Ok(SeatEngine::new(store, Arc::new(SystemClock), &config.session))
}

/// Helper: find an organization by id or by exact name.
pub async fn resolve_organization(
    store: &dyn SeatStore,
    reference: &str,
) -> Result<Organization, AppError> {
    if let Ok(id) = reference.parse::<OrganizationId>() {
        if let Some(organization) = store.find_organization(id).await? {
            return Ok(organization);
        }
    }

    store
        .list_organizations()
        .await?
        .into_iter()
        .find(|o| o.name == reference)
        .ok_or_else(|| AppError::not_found(format!("Organization '{reference}' not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seats_status() {
        let cli = Cli::try_parse_from(["seatguard", "seats", "status", "Acme Corp"]).unwrap();
        assert_eq!(cli.env, "production");
        assert!(matches!(
            cli.command,
            Commands::Seats(seats::SeatsArgs {
                command: seats::SeatsCommand::Status { .. }
            })
        ));
    }

    #[test]
    fn test_parse_audit_limit_and_json() {
        let cli = Cli::try_parse_from([
            "seatguard", "--format", "json", "audit", "Acme Corp", "--limit", "5",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Audit(args) => assert_eq!(args.limit, 5),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["seatguard", "serve"]).is_err());
    }
}
