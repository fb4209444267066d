//! Operator handlers for token revocation and device history.
//!
//! All endpoints require the operator bearer key via [`RequireOperator`].
//! Revocation is the only way a token ever enters the `Revoked` state;
//! nothing revokes automatically.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use adgate_core::device::is_valid_device_id;
use adgate_core::error::CoreError;
use adgate_core::types::DbId;
use adgate_db::repositories::AccessTokenRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::operator::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/keys/{id}/revoke
///
/// Force a token into the `Revoked` state. Idempotent: revoking twice
/// keeps the original `revoked_at`.
pub async fn revoke_key(
    _operator: RequireOperator,
    State(state): State<AppState>,
    Path(key_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let revoked = AccessTokenRepo::revoke(&state.pool, key_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccessToken",
            id: key_id.to_string(),
        }))?;

    tracing::info!(
        token_id = revoked.id,
        token_prefix = %revoked.token_prefix,
        device_id = %revoked.device_id,
        "Access token revoked",
    );

    Ok(Json(DataResponse { data: revoked }))
}

/// GET /api/v1/admin/devices/{device_id}/keys
///
/// Full token history for a device, newest first. Returns the safe
/// listing shape only -- the token hash never leaves the store.
pub async fn list_device_keys(
    _operator: RequireOperator,
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !is_valid_device_id(&device_id) {
        return Err(AppError::BadRequest("Invalid device id format".into()));
    }

    let keys = AccessTokenRepo::list_by_device(&state.pool, &device_id).await?;
    Ok(Json(DataResponse { data: keys }))
}
