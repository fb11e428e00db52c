//! Postgres implementations of the engine's collaborator traits.

use async_trait::async_trait;
use berita_core::document::{Document, DocumentKind, NewDocumentRecord};
use berita_core::paging::Page;
use berita_core::repository::{
    DocumentFilter, DocumentRepository, DocumentStats, RoleProvider, StoreError,
};
use berita_core::types::DbId;

use crate::repositories::{DocumentRepo, RoleRepo};
use crate::DbPool;

/// [`DocumentRepository`] backed by the `documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentStore {
    async fn get(&self, id: DbId) -> Result<Document, StoreError> {
        let row = DocumentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?
            .ok_or(StoreError::NotFound)?;
        Document::try_from(row).map_err(unavailable)
    }

    async fn create(&self, record: NewDocumentRecord) -> Result<Document, StoreError> {
        let row = DocumentRepo::create(&self.pool, &record)
            .await
            .map_err(unavailable)?;
        Document::try_from(row).map_err(unavailable)
    }

    async fn update_conditional(
        &self,
        next: &Document,
        expected_version: i32,
    ) -> Result<Document, StoreError> {
        let updated = DocumentRepo::update_if_version(&self.pool, next, expected_version)
            .await
            .map_err(unavailable)?;
        match updated {
            Some(row) => Document::try_from(row).map_err(unavailable),
            None => Err(self.missing_or_conflict(next.id, expected_version).await),
        }
    }

    async fn list(&self, filter: &DocumentFilter, page: Page) -> Result<Vec<Document>, StoreError> {
        DocumentRepo::list(&self.pool, filter, page)
            .await
            .map_err(unavailable)?
            .into_iter()
            .map(|row| Document::try_from(row).map_err(unavailable))
            .collect()
    }

    async fn stats(
        &self,
        kind: Option<DocumentKind>,
        vendor_id: Option<DbId>,
    ) -> Result<DocumentStats, StoreError> {
        DocumentRepo::count_by_stage(&self.pool, kind, vendor_id)
            .await
            .map(DocumentStats::from)
            .map_err(unavailable)
    }

    async fn delete(&self, id: DbId, expected_version: i32) -> Result<(), StoreError> {
        let deleted = DocumentRepo::delete_if_version(&self.pool, id, expected_version)
            .await
            .map_err(unavailable)?;
        if deleted {
            Ok(())
        } else {
            Err(self.missing_or_conflict(id, expected_version).await)
        }
    }
}

impl PgDocumentStore {
    /// A conditional write touched no row: tell a vanished row apart from a
    /// version that moved on.
    async fn missing_or_conflict(&self, id: DbId, expected_version: i32) -> StoreError {
        match DocumentRepo::exists(&self.pool, id).await {
            Ok(true) => StoreError::Conflict { expected_version },
            Ok(false) => StoreError::NotFound,
            Err(e) => unavailable(e),
        }
    }
}

/// [`RoleProvider`] reading the active user's role from `users`/`roles`.
#[derive(Debug, Clone)]
pub struct PgRoleProvider {
    pool: DbPool,
}

impl PgRoleProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleProvider for PgRoleProvider {
    async fn role_of(&self, actor_id: DbId) -> Result<Option<String>, StoreError> {
        RoleRepo::active_role_of(&self.pool, actor_id)
            .await
            .map_err(unavailable)
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    tracing::warn!(error = %err, "Database error in document store");
    StoreError::Unavailable(err.to_string())
}
