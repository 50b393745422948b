//! Development seed data.

use clap::Args;

use seatguard_auth::PasswordHasher;
use seatguard_core::config::AppConfig;
use seatguard_core::error::AppError;
use seatguard_database::{PgSeatStore, SeatStore};
use seatguard_entity::organization::NewOrganization;
use seatguard_entity::user::NewUser;

use crate::output;

/// Organizations created by `seed`: name and seat limit.
const ORGANIZATIONS: [(&str, i32); 3] = [
    ("Acme Corp", 10),
    ("TechStart Inc", 50),
    ("Small Biz LLC", 5),
];

/// Users created by `seed`: username, email, organization name.
const USERS: [(&str, &str, &str); 5] = [
    ("john_doe", "john@acme.com", "Acme Corp"),
    ("jane_smith", "jane@acme.com", "Acme Corp"),
    ("bob_wilson", "bob@techstart.com", "TechStart Inc"),
    ("alice_brown", "alice@smallbiz.com", "Small Biz LLC"),
    ("charlie_davis", "charlie@smallbiz.com", "Small Biz LLC"),
];

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Password given to every seeded user
    #[arg(long, default_value = "seatguard-dev")]
    pub password: String,
}

/// Execute `seed`. Existing organizations and users are left untouched.
pub async fn execute(args: &SeedArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = PgSeatStore::new(super::connect(config).await?);
    let existing = store.list_organizations().await?;

    let mut organizations = Vec::with_capacity(ORGANIZATIONS.len());
    for (name, seat_limit) in ORGANIZATIONS {
        let organization = match existing.iter().find(|o| o.name == name) {
            Some(organization) => {
                output::print_warning(&format!("Organization '{name}' already exists"));
                organization.clone()
            }
            None => {
                let organization = store
                    .insert_organization(NewOrganization {
                        name: name.to_string(),
                        seat_limit,
                    })
                    .await?;
                output::print_success(&format!("Created organization '{name}' ({seat_limit} seats)"));
                organization
            }
        };
        organizations.push(organization);
    }

    let password_hash = PasswordHasher::new().hash_password(&args.password)?;
    for (username, email, organization_name) in USERS {
        if store.find_user_by_username(username).await?.is_some() {
            output::print_warning(&format!("User '{username}' already exists"));
            continue;
        }

        let organization = organizations
            .iter()
            .find(|o| o.name == organization_name)
            .ok_or_else(|| AppError::internal(format!("Seed organization '{organization_name}' missing")))?;

        store
            .insert_user(NewUser {
                username: username.to_string(),
                email: Some(email.to_string()),
                password_hash: password_hash.clone(),
                organization_id: organization.id,
            })
            .await?;
        output::print_success(&format!("Created user '{username}' in '{organization_name}'"));
    }

    store.database().close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_seed_user_has_a_seed_organization() {
        for (username, _, organization) in USERS {
            assert!(
                ORGANIZATIONS.iter().any(|(name, _)| *name == organization),
                "{username} points at unknown organization {organization}"
            );
        }
    }
}
