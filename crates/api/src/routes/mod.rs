pub mod dashboard;
pub mod documents;
pub mod health;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents/{kind}                                list, create
/// /documents/{kind}/{id}                           get, delete (admin, archived only)
/// /documents/{kind}/{id}/approve                   approve at current stage
/// /documents/{kind}/{id}/reject                    reject at current stage
/// /documents/{kind}/{id}/archive                   archive (admin or owning vendor)
/// /documents/{kind}/{id}/restore                   restore (admin)
///
/// /dashboard/stats                                 counters (?kind=)
///
/// /uploads                                         multipart upload -> {url}
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/documents", documents::router())
        .nest("/dashboard", dashboard::router())
        .nest("/uploads", uploads::router(max_upload_bytes))
}
