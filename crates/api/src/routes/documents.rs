//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /{kind}                  -> list_documents
/// POST   /{kind}                  -> create_document
/// GET    /{kind}/{id}             -> get_document
/// DELETE /{kind}/{id}             -> delete_document
/// POST   /{kind}/{id}/approve     -> approve_document
/// POST   /{kind}/{id}/reject      -> reject_document
/// POST   /{kind}/{id}/archive     -> archive_document
/// POST   /{kind}/{id}/restore     -> restore_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{kind}",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/{kind}/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/{kind}/{id}/approve", post(documents::approve_document))
        .route("/{kind}/{id}/reject", post(documents::reject_document))
        .route("/{kind}/{id}/archive", post(documents::archive_document))
        .route("/{kind}/{id}/restore", post(documents::restore_document))
}
