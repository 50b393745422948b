//! Database migration command.

use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;

use crate::output;

/// Execute `migrate`
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;

    println!("Running database migrations...");
    seatguard_database::migration::run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");

    db.close().await;
    Ok(())
}
