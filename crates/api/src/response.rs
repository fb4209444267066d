//! Shared response envelope types for API handlers.
//!
//! Every successful API response is wrapped in `{ "data": ... }`.
//! [`DataResponse`] keeps that envelope typed instead of scattering
//! `serde_json::json!({ "data": ... })` across handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: payload }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
