//! Repository for the `users` table.

use berita_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, role_id, signature_url, is_active, created_at, updated_at";

/// Provides write operations for users; role reads go through
/// [`RoleRepo`](super::RoleRepo).
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, role_id, signature_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(&input.signature_url)
            .fetch_one(pool)
            .await
    }

    /// Move a user to a different role.
    ///
    /// Returns `true` if the row was updated.
    pub async fn set_role(pool: &PgPool, id: DbId, role_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
