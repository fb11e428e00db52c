//! Repository for the `roles` table and the role each user holds.
//!
//! Role names are the strings the approval engine compares against
//! (`berita_core::roles`); ids never leave the db crate.

use berita_core::types::DbId;
use sqlx::PgPool;

/// Provides role lookups.
pub struct RoleRepo;

impl RoleRepo {
    /// All role names, in seed order.
    pub async fn names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM roles ORDER BY id ASC")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Id of the role called `name` (case-sensitive).
    pub async fn id_by_name(pool: &PgPool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Name of the role held by `user_id`, or `None` if the user does not
    /// exist or is inactive.
    pub async fn active_role_of(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT r.name
             FROM users u
             JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1 AND u.is_active = true",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(name,)| name))
    }
}
