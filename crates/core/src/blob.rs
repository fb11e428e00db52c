//! Blob storage for signatures and attachments.
//!
//! The approval workflow never reads blobs; it only carries the returned
//! URLs around as opaque strings.

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Errors from a [`BlobStore`].
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts file bytes and returns a retrievable URL.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    async fn put(&self, bytes: &[u8], folder: &str, file_name: &str) -> Result<String, BlobError>;
}

/// Stores blobs on the local filesystem under `root`, served back by the
/// HTTP layer at `public_base_url`.
///
/// File names are the SHA-256 of the content plus the original extension,
/// so uploading the same file twice yields the same URL.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: &[u8], folder: &str, file_name: &str) -> Result<String, BlobError> {
        let folder = sanitize_folder(folder)?;
        let name = content_name(bytes, file_name);

        let dir = self.root.join(&folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), bytes).await?;

        tracing::debug!(folder = %folder, name = %name, size = bytes.len(), "Stored blob");
        Ok(format!("{}/{folder}/{name}", self.public_base_url))
    }
}

/// Folder must be a single segment of `[A-Za-z0-9_-]`.
fn sanitize_folder(folder: &str) -> Result<String, BlobError> {
    let folder = folder.trim();
    let valid = !folder.is_empty()
        && folder.len() <= 64
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(folder.to_ascii_lowercase())
    } else {
        Err(BlobError::InvalidPath(format!(
            "folder '{folder}' must be 1-64 characters of letters, digits, '_' or '-'"
        )))
    }
}

/// `<sha256-hex>[.<ext>]`, keeping only a short alphanumeric extension.
fn content_name(bytes: &[u8], file_name: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });
    match ext {
        Some(ext) => format!("{digest}.{ext}"),
        None => digest,
    }
}
