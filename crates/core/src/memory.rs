//! In-memory collaborators for tests and local development.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, DocumentKind, DocumentStatus, NewDocumentRecord, WorkflowStage};
use crate::paging::Page;
use crate::repository::{
    DocumentFilter, DocumentRepository, DocumentStats, RoleProvider, StoreError,
};
use crate::types::DbId;

#[derive(Debug, Default)]
struct Inner {
    last_id: DbId,
    documents: BTreeMap<DbId, Document>,
}

/// A [`DocumentRepository`] backed by a map behind an async `RwLock`.
///
/// Conditional writes take the write lock for the compare-and-swap, so
/// concurrent updates against the same version serialize exactly as the
/// Postgres `WHERE version = $n` update does.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    inner: RwLock<Inner>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, archived included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get(&self, id: DbId) -> Result<Document, StoreError> {
        self.inner
            .read()
            .await
            .documents
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, record: NewDocumentRecord) -> Result<Document, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let document = Document {
            id: inner.last_id,
            kind: record.kind,
            vendor_id: record.vendor_id,
            status: record.current_stage.status(),
            current_stage: record.current_stage,
            approval_history: record.approval_history,
            payload: record.payload,
            is_archived: false,
            archived_at: None,
            archived_by: None,
            version: 1,
            created_at: record.created_at,
            updated_at: record.created_at,
        };
        inner.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn update_conditional(
        &self,
        next: &Document,
        expected_version: i32,
    ) -> Result<Document, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .documents
            .get_mut(&next.id)
            .ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict { expected_version });
        }
        *stored = next.clone();
        Ok(stored.clone())
    }

    async fn list(&self, filter: &DocumentFilter, page: Page) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Document> = inner
            .documents
            .values()
            .filter(|d| filter.matches(d))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn stats(
        &self,
        kind: Option<DocumentKind>,
        vendor_id: Option<DbId>,
    ) -> Result<DocumentStats, StoreError> {
        let filter = DocumentFilter {
            kind,
            vendor_id,
            ..Default::default()
        };
        let inner = self.inner.read().await;
        let mut stats = DocumentStats::default();
        for doc in inner.documents.values().filter(|d| filter.matches(d)) {
            if doc.is_archived {
                stats.archived += 1;
                continue;
            }
            stats.total += 1;
            match doc.status {
                DocumentStatus::Pending => stats.pending += 1,
                DocumentStatus::Approved => stats.approved += 1,
                DocumentStatus::Rejected => stats.rejected += 1,
            }
            match doc.current_stage {
                WorkflowStage::WaitingPic => stats.waiting_pic += 1,
                WorkflowStage::WaitingDireksi => stats.waiting_direksi += 1,
                _ => {}
            }
        }
        Ok(stats)
    }

    async fn delete(&self, id: DbId, expected_version: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.documents.get(&id) {
            None => Err(StoreError::NotFound),
            Some(doc) if doc.version != expected_version => {
                Err(StoreError::Conflict { expected_version })
            }
            Some(_) => {
                inner.documents.remove(&id);
                Ok(())
            }
        }
    }
}

/// A [`RoleProvider`] with a fixed actor-to-role table.
#[derive(Debug, Default)]
pub struct StaticRoleProvider {
    roles: RwLock<HashMap<DbId, String>>,
}

impl StaticRoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(actor_id, role)` pairs.
    pub fn with_roles<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (DbId, S)>,
        S: Into<String>,
    {
        Self {
            roles: RwLock::new(pairs.into_iter().map(|(id, r)| (id, r.into())).collect()),
        }
    }

    /// Assign or replace an actor's role.
    pub async fn set_role(&self, actor_id: DbId, role: impl Into<String>) {
        self.roles.write().await.insert(actor_id, role.into());
    }

    /// Forget an actor, as if deactivated.
    pub async fn remove(&self, actor_id: DbId) {
        self.roles.write().await.remove(&actor_id);
    }
}

#[async_trait]
impl RoleProvider for StaticRoleProvider {
    async fn role_of(&self, actor_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(self.roles.read().await.get(&actor_id).cloned())
    }
}
