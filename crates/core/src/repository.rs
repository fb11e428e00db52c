//! Collaborator seams consumed by the approval engine.
//!
//! The engine only ever talks to persistence and identity through these
//! traits, so it runs unchanged against Postgres (`berita_db::store`) or
//! the in-memory implementations in [`crate::memory`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentKind, DocumentStatus, NewDocumentRecord};
use crate::paging::Page;
use crate::types::DbId;

/// Errors reported by a [`DocumentRepository`] or [`RoleProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with the requested id.
    #[error("record not found")]
    NotFound,

    /// A conditional write found a different version than expected.
    #[error("version mismatch: expected {expected_version}")]
    Conflict { expected_version: i32 },

    /// The backend failed (connection, serialization, corrupt row, ...).
    #[error("storage backend error: {0}")]
    Unavailable(String),
}

/// Listing filter. `None` means "don't filter on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFilter {
    pub kind: Option<DocumentKind>,
    pub status: Option<DocumentStatus>,
    pub archived: Option<bool>,
    pub vendor_id: Option<DbId>,
}

impl DocumentFilter {
    /// Whether `document` satisfies every set field.
    pub fn matches(&self, document: &Document) -> bool {
        self.kind.map_or(true, |k| k == document.kind)
            && self.status.map_or(true, |s| s == document.status)
            && self.archived.map_or(true, |a| a == document.is_archived)
            && self.vendor_id.map_or(true, |v| v == document.vendor_id)
    }
}

/// Dashboard counters.
///
/// All stage/status counters cover non-archived documents only;
/// `archived` counts the archived ones separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub total: i64,
    pub pending: i64,
    pub waiting_pic: i64,
    pub waiting_direksi: i64,
    pub approved: i64,
    pub rejected: i64,
    pub archived: i64,
}

/// Persistent store of documents with optimistic-concurrency writes.
///
/// Implementations must be `Send + Sync + 'static` so they can sit behind
/// an `Arc` in axum application state.
#[async_trait]
pub trait DocumentRepository: Send + Sync + 'static {
    /// Fetch a document by id, archived or not.
    async fn get(&self, id: DbId) -> Result<Document, StoreError>;

    /// Insert a new document at version 1.
    async fn create(&self, record: NewDocumentRecord) -> Result<Document, StoreError>;

    /// Replace the stored document with `next` only if the stored version
    /// is still `expected_version`. Returns the stored result.
    async fn update_conditional(
        &self,
        next: &Document,
        expected_version: i32,
    ) -> Result<Document, StoreError>;

    /// Newest first.
    async fn list(&self, filter: &DocumentFilter, page: Page) -> Result<Vec<Document>, StoreError>;

    async fn stats(
        &self,
        kind: Option<DocumentKind>,
        vendor_id: Option<DbId>,
    ) -> Result<DocumentStats, StoreError>;

    /// Physically remove a document, conditioned on its version.
    async fn delete(&self, id: DbId, expected_version: i32) -> Result<(), StoreError>;
}

/// Server-side source of truth for actor roles.
#[async_trait]
pub trait RoleProvider: Send + Sync + 'static {
    /// The actor's current role, or `None` for unknown/inactive actors.
    async fn role_of(&self, actor_id: DbId) -> Result<Option<String>, StoreError>;
}
