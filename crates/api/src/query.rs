//! Shared query parameter types for API handlers.

use berita_core::document::{DocumentKind, DocumentStatus};
use berita_core::paging::Page;
use berita_core::repository::DocumentFilter;
use berita_core::types::DbId;
use serde::Deserialize;

/// Query parameters for document listings
/// (`?status=&archived=&vendor_id=&limit=&offset=`).
///
/// Values are clamped via `clamp_limit` / `clamp_offset` when converted to
/// a [`Page`].
#[derive(Debug, Default, Deserialize)]
pub struct DocumentListParams {
    pub status: Option<DocumentStatus>,
    pub archived: Option<bool>,
    pub vendor_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DocumentListParams {
    pub fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            kind: None,
            status: self.status,
            archived: self.archived,
            vendor_id: self.vendor_id,
        }
    }

    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

/// Query parameters for the dashboard counters (`?kind=`).
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub kind: Option<DocumentKind>,
}
