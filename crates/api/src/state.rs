use std::sync::Arc;

use berita_core::blob::BlobStore;
use berita_core::engine::ApprovalEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: berita_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Document approval lifecycle.
    pub engine: Arc<ApprovalEngine>,
    /// Storage for signature images and attachments.
    pub blobs: Arc<dyn BlobStore>,
}
