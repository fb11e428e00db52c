//! Repository for the `documents` table.
//!
//! Writes are conditional on `version` so concurrent reviewers cannot
//! overwrite each other's history entries.

use berita_core::document::{Document, DocumentKind, NewDocumentRecord};
use berita_core::paging::Page;
use berita_core::repository::DocumentFilter;
use berita_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::document::{DocumentCounts, DocumentRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, kind, vendor_id, status, current_stage, approval_history, payload, \
                        is_archived, archived_at, archived_by, version, created_at, updated_at";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document at version 1, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewDocumentRecord,
    ) -> Result<DocumentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (kind, vendor_id, status, current_stage, approval_history, payload,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(input.kind.as_str())
            .bind(input.vendor_id)
            .bind(input.current_stage.status().as_str())
            .bind(input.current_stage.as_str())
            .bind(Json(&input.approval_history))
            .bind(&input.payload)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a document by ID, archived or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List documents matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &DocumentFilter,
        page: Page,
    ) -> Result<Vec<DocumentRow>, sqlx::Error> {
        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.archived.is_some() {
            conditions.push(format!("is_archived = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.vendor_id.is_some() {
            conditions.push(format!("vendor_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM documents \
             {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, DocumentRow>(&query);

        // Bind dynamic parameters in order.
        if let Some(kind) = filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(archived) = filter.archived {
            q = q.bind(archived);
        }
        if let Some(vendor_id) = filter.vendor_id {
            q = q.bind(vendor_id);
        }

        q.bind(page.limit).bind(page.offset).fetch_all(pool).await
    }

    /// Overwrite the mutable columns of `next` if the stored row is still at
    /// `expected_version`.
    ///
    /// Returns `None` when the row is missing or the version has moved on.
    pub async fn update_if_version(
        pool: &PgPool,
        next: &Document,
        expected_version: i32,
    ) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                status = $3,
                current_stage = $4,
                approval_history = $5,
                payload = $6,
                is_archived = $7,
                archived_at = $8,
                archived_by = $9,
                version = $10,
                updated_at = $11
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(next.id)
            .bind(expected_version)
            .bind(next.status.as_str())
            .bind(next.current_stage.as_str())
            .bind(Json(&next.approval_history))
            .bind(&next.payload)
            .bind(next.is_archived)
            .bind(next.archived_at)
            .bind(next.archived_by)
            .bind(next.version)
            .bind(next.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a document at `expected_version`.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete_if_version(
        pool: &PgPool,
        id: DbId,
        expected_version: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(expected_version)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a document with `id` exists at all.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Dashboard counters, optionally scoped to one kind and/or vendor.
    pub async fn count_by_stage(
        pool: &PgPool,
        kind: Option<DocumentKind>,
        vendor_id: Option<DbId>,
    ) -> Result<DocumentCounts, sqlx::Error> {
        sqlx::query_as::<_, DocumentCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE NOT is_archived) AS total,
                COUNT(*) FILTER (WHERE NOT is_archived AND status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE NOT is_archived AND current_stage = 'waiting_pic') AS waiting_pic,
                COUNT(*) FILTER (WHERE NOT is_archived AND current_stage = 'waiting_direksi') AS waiting_direksi,
                COUNT(*) FILTER (WHERE NOT is_archived AND status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE NOT is_archived AND status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE is_archived) AS archived
             FROM documents
             WHERE ($1::text IS NULL OR kind = $1)
               AND ($2::bigint IS NULL OR vendor_id = $2)",
        )
        .bind(kind.map(DocumentKind::as_str))
        .bind(vendor_id)
        .fetch_one(pool)
        .await
    }
}
