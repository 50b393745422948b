//! Organization repository.

use sqlx::PgExecutor;

use seatguard_core::result::AppResult;
use seatguard_core::types::OrganizationId;
use seatguard_entity::organization::{NewOrganization, Organization};

use super::{insert_error, store_error};

/// Queries against `organizations`.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    /// Find an organization by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, seat_limit, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(store_error("Failed to find organization"))
    }

    /// Find and row-lock an organization for the rest of the transaction.
    pub async fn lock<'e, E: PgExecutor<'e>>(
        executor: E,
        id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, seat_limit, created_at FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(store_error("Failed to lock organization"))
    }

    /// List all organizations by name.
    pub async fn list<'e, E: PgExecutor<'e>>(executor: E) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, seat_limit, created_at FROM organizations ORDER BY name",
        )
        .fetch_all(executor)
        .await
        .map_err(store_error("Failed to list organizations"))
    }

    /// Insert an organization.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        new: &NewOrganization,
    ) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, seat_limit) VALUES ($1, $2, $3) \
             RETURNING id, name, seat_limit, created_at",
        )
        .bind(OrganizationId::new())
        .bind(&new.name)
        .bind(new.seat_limit)
        .fetch_one(executor)
        .await
        .map_err(insert_error("Failed to insert organization"))
    }
}
