//! Document row model.
//!
//! Enum columns are stored as their snake_case text and parsed back into
//! the core types on read; a value the CHECK constraints should have made
//! impossible surfaces as a decode error rather than a panic.

use std::str::FromStr;

use berita_core::document::{
    ApprovalLogEntry, Document, DocumentKind, DocumentStatus, WorkflowStage,
};
use berita_core::repository::DocumentStats;
use berita_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: DbId,
    pub kind: String,
    pub vendor_id: DbId,
    pub status: String,
    pub current_stage: String,
    pub approval_history: Json<Vec<ApprovalLogEntry>>,
    pub payload: serde_json::Value,
    pub is_archived: bool,
    pub archived_at: Option<Timestamp>,
    pub archived_by: Option<DbId>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            kind: parse_column::<DocumentKind>("kind", &row.kind)?,
            vendor_id: row.vendor_id,
            status: parse_column::<DocumentStatus>("status", &row.status)?,
            current_stage: parse_column::<WorkflowStage>("current_stage", &row.current_stage)?,
            approval_history: row.approval_history.0,
            payload: row.payload,
            is_archived: row.is_archived,
            archived_at: row.archived_at,
            archived_by: row.archived_by,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|message| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    })
}

/// Aggregated counters for the dashboard.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct DocumentCounts {
    pub total: i64,
    pub pending: i64,
    pub waiting_pic: i64,
    pub waiting_direksi: i64,
    pub approved: i64,
    pub rejected: i64,
    pub archived: i64,
}

impl From<DocumentCounts> for DocumentStats {
    fn from(c: DocumentCounts) -> Self {
        DocumentStats {
            total: c.total,
            pending: c.pending,
            waiting_pic: c.waiting_pic,
            waiting_direksi: c.waiting_direksi,
            approved: c.approved,
            rejected: c.rejected,
            archived: c.archived,
        }
    }
}
