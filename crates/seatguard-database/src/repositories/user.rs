//! User repository.

use sqlx::PgExecutor;

use seatguard_core::result::AppResult;
use seatguard_core::types::UserId;
use seatguard_entity::user::{NewUser, User};

use super::{insert_error, store_error};

const USER_COLUMNS: &str = "id, username, email, password_hash, organization_id, created_at";

/// Queries against `users`.
#[derive(Debug, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: UserId,
    ) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(store_error("Failed to find user"))
    }

    /// Find a user by login name.
    pub async fn find_by_username<'e, E: PgExecutor<'e>>(
        executor: E,
        username: &str,
    ) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(executor)
            .await
            .map_err(store_error("Failed to find user by username"))
    }

    /// Insert a user.
    pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, new: &NewUser) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, organization_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(UserId::new())
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.organization_id)
            .fetch_one(executor)
            .await
            .map_err(insert_error("Failed to insert user"))
    }
}
