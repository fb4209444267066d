pub mod admin;
pub mod health;
pub mod keys;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /keys/issue                      issue a pending token (public)
/// /keys/validate                   activate-or-validate (public)
///
/// /admin/keys/{id}/revoke          revoke a token (operator key)
/// /admin/devices/{device_id}/keys  token history for a device (operator key)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/keys", keys::router())
        .nest("/admin", admin::router())
}
