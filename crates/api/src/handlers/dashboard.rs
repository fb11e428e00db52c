//! Handlers for the `/dashboard` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::StatsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
///
/// Document counters by stage, optionally for one kind (`?kind=bapb`).
/// Vendors only see counts for their own documents.
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> AppResult<impl IntoResponse> {
    let stats = state.engine.stats(params.kind, &auth.actor()).await?;
    Ok(Json(DataResponse { data: stats }))
}
