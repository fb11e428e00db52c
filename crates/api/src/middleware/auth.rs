//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use berita_core::document::Actor;
use berita_core::error::CoreError;
use berita_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// Only proves identity. Permission checks happen in the approval engine,
/// which resolves the user's current role itself.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Role claimed by the token; informational only.
    pub role: String,
    /// Display name from the token.
    pub name: String,
}

impl AuthUser {
    /// The engine-facing principal for this request.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.name.clone())
    }

    /// Like [`actor`](Self::actor), carrying a signature for the history entry.
    pub fn signing_actor(&self, signature_url: Option<String>) -> Actor {
        let actor = self.actor();
        match signature_url {
            Some(url) if !url.trim().is_empty() => actor.with_signature(url),
            _ => actor,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            name: claims.name,
        })
    }
}
