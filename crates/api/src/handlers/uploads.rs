//! Handlers for the `/uploads` resource.
//!
//! Stores signature images and attachments and returns the URL to embed
//! in a document payload or approval request.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use berita_core::blob::BlobError;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Folders uploads may be filed under.
pub const UPLOAD_FOLDERS: &[&str] = &["attachments", "signatures"];

/// Folder used when the form omits `folder`.
const DEFAULT_FOLDER: &str = "attachments";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub size_bytes: usize,
}

/// POST /api/v1/uploads
///
/// Accepts a multipart form with a required `file` field and an optional
/// `folder` field (`attachments` or `signatures`).
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut folder = DEFAULT_FOLDER.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((filename, data.to_vec()));
            }
            "folder" => {
                folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            _ => {} // ignore unknown fields
        }
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} byte upload limit",
            state.config.max_upload_bytes
        )));
    }
    if !UPLOAD_FOLDERS.contains(&folder.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown folder '{folder}'. Must be one of: {}",
            UPLOAD_FOLDERS.join(", ")
        )));
    }

    let url = state
        .blobs
        .put(&data, &folder, &filename)
        .await
        .map_err(|e| match e {
            BlobError::InvalidPath(msg) => AppError::BadRequest(msg),
            BlobError::Io(err) => AppError::InternalError(err.to_string()),
        })?;

    tracing::info!(user_id = auth.user_id, folder = %folder, size = data.len(), "File uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                url,
                size_bytes: data.len(),
            },
        }),
    ))
}
