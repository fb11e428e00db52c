//! Async approval engine.
//!
//! Every mutation follows the same read-check-write discipline: load a
//! snapshot, decide with [`workflow::plan`], build the next document with
//! [`workflow::apply`], and write it back with
//! [`DocumentRepository::update_conditional`] against the snapshot's
//! version. Losing a race surfaces as [`WorkflowError::Conflict`].
//!
//! Roles are always resolved through the [`RoleProvider`] from the actor
//! id; nothing the caller claims about its role is consulted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use crate::document::{Actor, Document, DocumentKind, NewDocumentRecord, WorkflowStage};
use crate::error::WorkflowError;
use crate::paging::Page;
use crate::payload::validate_payload;
use crate::repository::{
    DocumentFilter, DocumentRepository, DocumentStats, RoleProvider, StoreError,
};
use crate::roles::{ROLE_ADMIN, ROLE_VENDOR};
use crate::types::DbId;
use crate::workflow::{self, Action, WorkflowConfig};

/// Default deadline for a single repository or role lookup.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Submission input for [`ApprovalEngine::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    /// Required when an admin submits on a vendor's behalf; vendors may
    /// omit it or must pass their own id.
    pub vendor_id: Option<DbId>,
    pub payload: serde_json::Value,
}

/// Owns the approval lifecycle of BAPB and BAPP documents.
///
/// Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct ApprovalEngine {
    documents: Arc<dyn DocumentRepository>,
    roles: Arc<dyn RoleProvider>,
    storage_timeout: Duration,
}

impl ApprovalEngine {
    pub fn new(documents: Arc<dyn DocumentRepository>, roles: Arc<dyn RoleProvider>) -> Self {
        Self {
            documents,
            roles,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Deadline for each repository or role lookup.
    ///
    /// A conditional write can commit and still report a failure (timeout
    /// or dropped connection). The engine then re-reads the document and
    /// returns it when the stored version is the one it wrote, so the
    /// caller only sees `storage_unavailable` when the outcome is unknown.
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch one document. Vendors only see their own.
    pub async fn get(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
    ) -> Result<Document, WorkflowError> {
        let role = self.resolve_role(actor).await?;
        self.load_visible(kind, id, actor, &role).await
    }

    /// List documents of `kind`, newest first.
    ///
    /// Archived documents are excluded unless `filter.archived` asks for
    /// them; vendors are always scoped to their own documents.
    pub async fn list(
        &self,
        kind: DocumentKind,
        mut filter: DocumentFilter,
        page: Page,
        actor: &Actor,
    ) -> Result<Vec<Document>, WorkflowError> {
        let role = self.resolve_role(actor).await?;
        filter.kind = Some(kind);
        filter.archived = Some(filter.archived.unwrap_or(false));
        if role == ROLE_VENDOR {
            filter.vendor_id = Some(actor.id);
        }
        self.call(self.documents.list(&filter, page))
            .await
            .map_err(storage)
    }

    /// Dashboard counters, optionally for a single kind.
    pub async fn stats(
        &self,
        kind: Option<DocumentKind>,
        actor: &Actor,
    ) -> Result<DocumentStats, WorkflowError> {
        let role = self.resolve_role(actor).await?;
        let vendor_id = (role == ROLE_VENDOR).then_some(actor.id);
        self.call(self.documents.stats(kind, vendor_id))
            .await
            .map_err(storage)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Submit a new document. It always enters at `waiting_pic` with a
    /// single self-approved `vendor_submit` history entry.
    pub async fn create(
        &self,
        kind: DocumentKind,
        input: NewDocument,
        submitter: &Actor,
    ) -> Result<Document, WorkflowError> {
        let role = self.resolve_role(submitter).await?;
        let vendor_id = match role.as_str() {
            ROLE_VENDOR => match input.vendor_id {
                Some(v) if v != submitter.id => {
                    return Err(WorkflowError::Unauthorized(
                        "vendors may only submit documents for themselves".into(),
                    ));
                }
                _ => submitter.id,
            },
            ROLE_ADMIN => {
                let vendor_id = input.vendor_id.ok_or_else(|| {
                    WorkflowError::Validation(
                        "vendor_id is required when submitting as admin".into(),
                    )
                })?;
                self.require_vendor(vendor_id).await?;
                vendor_id
            }
            other => {
                return Err(WorkflowError::Unauthorized(format!(
                    "role '{other}' may not submit {kind} documents"
                )));
            }
        };
        let payload = validate_payload(kind, input.payload)?;

        let now = Utc::now();
        let record = NewDocumentRecord {
            kind,
            vendor_id,
            current_stage: WorkflowStage::WaitingPic,
            approval_history: workflow::initial_history(submitter, &role, now),
            payload,
            created_at: now,
        };
        let document = self
            .call(self.documents.create(record))
            .await
            .map_err(storage)?;

        tracing::info!(
            document_id = document.id,
            kind = %kind,
            vendor_id = document.vendor_id,
            actor_id = submitter.id,
            "Document submitted"
        );
        Ok(document)
    }

    /// Approve the document at its current waiting stage.
    pub async fn approve(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Document, WorkflowError> {
        self.transition(kind, id, actor, Action::Approve, workflow::normalize_notes(notes))
            .await
    }

    /// Reject the document at its current waiting stage. Terminal.
    ///
    /// `notes` are mandatory and checked before touching storage.
    pub async fn reject(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Document, WorkflowError> {
        let notes = workflow::require_rejection_notes(notes)?;
        self.transition(kind, id, actor, Action::Reject, Some(notes))
            .await
    }

    async fn transition(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
        action: Action,
        notes: Option<String>,
    ) -> Result<Document, WorkflowError> {
        let role = self.resolve_role(actor).await?;
        let snapshot = self.load_visible(kind, id, actor, &role).await?;

        let planned = workflow::plan(WorkflowConfig::for_kind(kind), &snapshot, action, &role)
            .inspect_err(|e| {
                tracing::debug!(
                    document_id = id,
                    kind = %kind,
                    actor_id = actor.id,
                    role = %role,
                    action = action.as_str(),
                    outcome = e.code(),
                    "Transition refused"
                );
            })?;

        let next = workflow::apply(&snapshot, &planned, actor, &role, notes, Utc::now());
        let stored = self.write(kind, &next, snapshot.version).await?;

        tracing::info!(
            document_id = id,
            kind = %kind,
            actor_id = actor.id,
            role = %role,
            action = action.as_str(),
            from = %planned.from,
            to = %planned.to,
            "Document transitioned"
        );
        Ok(stored)
    }

    /// Soft-delete: hide from primary listings without touching the
    /// approval state. Admins and the owning vendor may archive.
    pub async fn archive(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
    ) -> Result<Document, WorkflowError> {
        let role = self.resolve_role(actor).await?;
        let snapshot = self.load_visible(kind, id, actor, &role).await?;

        // `load_visible` already hid foreign documents from vendors.
        if role != ROLE_ADMIN && role != ROLE_VENDOR {
            return Err(WorkflowError::Unauthorized(format!(
                "role '{role}' may not archive document {id}"
            )));
        }
        if snapshot.is_archived {
            return Err(WorkflowError::Validation(format!(
                "document {id} is already archived"
            )));
        }

        let now = Utc::now();
        let mut next = snapshot.clone();
        next.is_archived = true;
        next.archived_at = Some(now);
        next.archived_by = Some(actor.id);
        next.updated_at = now;
        next.version += 1;
        let stored = self.write(kind, &next, snapshot.version).await?;

        tracing::info!(document_id = id, kind = %kind, actor_id = actor.id, "Document archived");
        Ok(stored)
    }

    /// Undo [`archive`](Self::archive). Admin only.
    pub async fn restore(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
    ) -> Result<Document, WorkflowError> {
        self.require_admin(actor, "restore").await?;
        let snapshot = self.load(kind, id).await?;
        if !snapshot.is_archived {
            return Err(WorkflowError::Validation(format!(
                "document {id} is not archived"
            )));
        }

        let mut next = snapshot.clone();
        next.is_archived = false;
        next.archived_at = None;
        next.archived_by = None;
        next.updated_at = Utc::now();
        next.version += 1;
        let stored = self.write(kind, &next, snapshot.version).await?;

        tracing::info!(document_id = id, kind = %kind, actor_id = actor.id, "Document restored");
        Ok(stored)
    }

    /// Permanently remove an archived document. Admin only.
    pub async fn delete(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
    ) -> Result<(), WorkflowError> {
        self.require_admin(actor, "delete").await?;
        let snapshot = self.load(kind, id).await?;
        if !snapshot.is_archived {
            return Err(WorkflowError::Validation(format!(
                "document {id} must be archived before it can be deleted"
            )));
        }

        self.call(self.documents.delete(id, snapshot.version))
            .await
            .map_err(|e| from_store(e, kind, id))?;

        tracing::warn!(
            document_id = id,
            kind = %kind,
            actor_id = actor.id,
            "Document permanently deleted"
        );
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Run a storage call under the configured deadline.
    async fn call<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.storage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "timed out after {}ms",
                self.storage_timeout.as_millis()
            ))),
        }
    }

    async fn resolve_role(&self, actor: &Actor) -> Result<String, WorkflowError> {
        self.call(self.roles.role_of(actor.id))
            .await
            .map_err(storage)?
            .ok_or_else(|| {
                WorkflowError::Unauthorized(format!("actor {} has no active role", actor.id))
            })
    }

    async fn require_admin(&self, actor: &Actor, what: &str) -> Result<(), WorkflowError> {
        let role = self.resolve_role(actor).await?;
        if role != ROLE_ADMIN {
            return Err(WorkflowError::Unauthorized(format!(
                "only admin may {what} documents (actor role '{role}')"
            )));
        }
        Ok(())
    }

    /// `vendor_id` named by an admin submission must belong to an active
    /// vendor.
    async fn require_vendor(&self, vendor_id: DbId) -> Result<(), WorkflowError> {
        let role = self
            .call(self.roles.role_of(vendor_id))
            .await
            .map_err(storage)?;
        if role.as_deref() != Some(ROLE_VENDOR) {
            return Err(WorkflowError::Validation(format!(
                "vendor_id {vendor_id} does not name a vendor"
            )));
        }
        Ok(())
    }

    /// [`load`](Self::load), hiding other vendors' documents from vendors.
    async fn load_visible(
        &self,
        kind: DocumentKind,
        id: DbId,
        actor: &Actor,
        role: &str,
    ) -> Result<Document, WorkflowError> {
        let document = self.load(kind, id).await?;
        if role == ROLE_VENDOR && document.vendor_id != actor.id {
            return Err(not_found(kind, id));
        }
        Ok(document)
    }

    /// Load a document, treating a kind mismatch as absence.
    async fn load(&self, kind: DocumentKind, id: DbId) -> Result<Document, WorkflowError> {
        let document = self
            .call(self.documents.get(id))
            .await
            .map_err(|e| from_store(e, kind, id))?;
        if document.kind != kind {
            return Err(not_found(kind, id));
        }
        Ok(document)
    }

    async fn write(
        &self,
        kind: DocumentKind,
        next: &Document,
        expected_version: i32,
    ) -> Result<Document, WorkflowError> {
        match self
            .call(self.documents.update_conditional(next, expected_version))
            .await
        {
            Ok(stored) => Ok(stored),
            Err(StoreError::Unavailable(msg)) => self.reconcile(kind, next, msg).await,
            Err(e) => {
                if matches!(e, StoreError::Conflict { .. }) {
                    tracing::warn!(
                        document_id = next.id,
                        kind = %kind,
                        expected_version,
                        "Lost optimistic-concurrency race"
                    );
                }
                Err(from_store(e, kind, next.id))
            }
        }
    }

    /// A write failed without a definite answer: return the stored document
    /// if it already carries `next`, otherwise report the original failure.
    async fn reconcile(
        &self,
        kind: DocumentKind,
        next: &Document,
        msg: String,
    ) -> Result<Document, WorkflowError> {
        match self.call(self.documents.get(next.id)).await {
            Ok(stored) if is_same_write(&stored, next) => {
                tracing::warn!(
                    document_id = next.id,
                    kind = %kind,
                    version = next.version,
                    error = %msg,
                    "Write reported failure but was stored"
                );
                Ok(stored)
            }
            _ => Err(storage_unavailable(msg)),
        }
    }
}

/// Whether `stored` is the result of writing `next`. Timestamps are not
/// compared since the backend may truncate their precision.
fn is_same_write(stored: &Document, next: &Document) -> bool {
    let last_entry = |d: &Document| d.approval_history.last().map(|e| (e.stage, e.actor_id));
    stored.version == next.version
        && stored.current_stage == next.current_stage
        && stored.is_archived == next.is_archived
        && stored.archived_by == next.archived_by
        && stored.approval_history.len() == next.approval_history.len()
        && last_entry(stored) == last_entry(next)
}

fn not_found(kind: DocumentKind, id: DbId) -> WorkflowError {
    WorkflowError::NotFound {
        kind: kind.as_str(),
        id,
    }
}

fn from_store(err: StoreError, kind: DocumentKind, id: DbId) -> WorkflowError {
    match err {
        StoreError::NotFound => not_found(kind, id),
        StoreError::Conflict { expected_version } => WorkflowError::Conflict {
            id,
            expected_version,
        },
        StoreError::Unavailable(msg) => storage_unavailable(msg),
    }
}

/// For calls not tied to a single document.
fn storage(err: StoreError) -> WorkflowError {
    match err {
        StoreError::Unavailable(msg) => storage_unavailable(msg),
        other => storage_unavailable(other.to_string()),
    }
}

fn storage_unavailable(msg: String) -> WorkflowError {
    tracing::error!(error = %msg, "Document storage unavailable");
    WorkflowError::StorageUnavailable(msg)
}
