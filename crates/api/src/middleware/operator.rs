//! Operator-key extractor for admin endpoints.
//!
//! There are no user accounts, sessions, or roles in this service; the
//! operator surface is a single shared bearer key set via
//! `ADMIN_API_KEY`. Use the extractor as a handler parameter:
//!
//! ```ignore
//! async fn my_handler(_operator: RequireOperator) -> AppResult<Json<()>> {
//!     Ok(Json(()))
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use adgate_core::error::CoreError;
use adgate_core::token::hash_token;

use crate::error::AppError;
use crate::state::AppState;

/// Marker extractor: the request carried the operator bearer key.
#[derive(Debug, Clone)]
pub struct RequireOperator;

impl FromRequestParts<AppState> for RequireOperator {
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

        let key = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <key>".into(),
            ))
        })?;

        // Compare digests rather than the raw strings.
        if hash_token(key) != hash_token(&state.config.admin_api_key) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid operator key".into(),
            )));
        }

        Ok(RequireOperator)
    }
}
