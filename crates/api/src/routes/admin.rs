//! Route definitions for the operator surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler checks the operator key.
///
/// ```text
/// POST /keys/{id}/revoke          -> revoke_key
/// GET  /devices/{device_id}/keys  -> list_device_keys
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keys/{id}/revoke", post(admin::revoke_key))
        .route("/devices/{device_id}/keys", get(admin::list_device_keys))
}
