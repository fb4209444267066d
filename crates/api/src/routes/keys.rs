//! Route definitions for the `/keys` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::keys;
use crate::state::AppState;

/// Routes mounted at `/keys`.
///
/// ```text
/// POST /issue     -> issue
/// POST /validate  -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/issue", post(keys::issue))
        .route("/validate", post(keys::validate))
}
