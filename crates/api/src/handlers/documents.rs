//! Handlers for the `/documents/{kind}` resource.
//!
//! Every handler delegates to the approval engine, which owns visibility,
//! authorization and state transitions. Handlers only translate HTTP input
//! into engine calls and wrap results in the `{ "data": ... }` envelope.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use berita_core::document::DocumentKind;
use berita_core::engine::NewDocument;
use berita_core::error::CoreError;
use berita_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::DocumentListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for approve/reject.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(max = 1000))]
    pub signature_url: Option<String>,
}

/// Parse the `{kind}` path segment.
fn parse_kind(raw: &str) -> AppResult<DocumentKind> {
    raw.parse::<DocumentKind>()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

/// GET /api/v1/documents/{kind}
///
/// List documents of one kind, newest first. Archived documents are only
/// returned with `?archived=true`.
pub async fn list_documents(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let documents = state
        .engine
        .list(kind, params.filter(), params.page(), &auth.actor())
        .await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/documents/{kind}
///
/// Submit a new document. Vendors submit for themselves; admins must name
/// the vendor with `vendor_id`.
pub async fn create_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(input): Json<NewDocument>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let document = state.engine.create(kind, input, &auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/documents/{kind}/{id}
pub async fn get_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let document = state.engine.get(kind, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: document }))
}

/// POST /api/v1/documents/{kind}/{id}/approve
///
/// Approve at the current waiting stage. Body: `{ notes?, signature_url? }`.
pub async fn approve_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let actor = auth.signing_actor(input.signature_url);
    let document = state.engine.approve(kind, id, &actor, input.notes).await?;
    Ok(Json(DataResponse { data: document }))
}

/// POST /api/v1/documents/{kind}/{id}/reject
///
/// Reject at the current waiting stage. Body: `{ notes, signature_url? }`;
/// notes are mandatory.
pub async fn reject_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let actor = auth.signing_actor(input.signature_url);
    let document = state.engine.reject(kind, id, &actor, input.notes).await?;
    Ok(Json(DataResponse { data: document }))
}

/// POST /api/v1/documents/{kind}/{id}/archive
pub async fn archive_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let document = state.engine.archive(kind, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: document }))
}

/// POST /api/v1/documents/{kind}/{id}/restore
pub async fn restore_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let document = state.engine.restore(kind, id, &auth.actor()).await?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/documents/{kind}/{id}
///
/// Permanently delete an archived document. Returns 204 on success.
pub async fn delete_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    state.engine.delete(kind, id, &auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
