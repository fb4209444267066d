//! Handlers for the `/keys` resource (issuance and validation).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use adgate_core::device::is_valid_device_id;
use adgate_core::token::{self, generate_token};
use adgate_core::types::Timestamp;
use adgate_db::models::access_token::{CreateAccessToken, TokenState};
use adgate_db::repositories::AccessTokenRepo;

use crate::callback::validate_callback_url;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /keys/issue`.
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub device_id: String,
    pub callback_url: String,
}

/// Response payload for a successful issuance.
///
/// `token` is the plaintext token id, returned exactly once and never
/// stored server-side. `gate_url` is the opaque URL the device must
/// send the user through before the token can be activated.
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub token: String,
    pub gate_url: String,
}

/// Request body for `POST /keys/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
    pub device_id: String,
}

/// Response payload for validation.
///
/// Deliberately constant in shape: lookup misses, device mismatches,
/// expiry, and revocation are indistinguishable to the caller.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

fn invalid() -> Json<DataResponse<ValidateResponse>> {
    Json(DataResponse {
        data: ValidateResponse {
            valid: false,
            expires_at: None,
        },
    })
}

fn valid(expires_at: Timestamp) -> Json<DataResponse<ValidateResponse>> {
    Json(DataResponse {
        data: ValidateResponse {
            valid: true,
            expires_at: Some(expires_at),
        },
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/keys/issue
///
/// Create a pending token bound to the device and exchange the callback
/// URL for a gate URL. The token is useless until the browser completes
/// the gate round trip and the device calls `validate` with it.
pub async fn issue(
    State(state): State<AppState>,
    Json(input): Json<IssueRequest>,
) -> AppResult<impl IntoResponse> {
    if !is_valid_device_id(&input.device_id) {
        return Err(AppError::BadRequest("Invalid device id format".into()));
    }

    let mut destination = validate_callback_url(&input.callback_url, &state.config)
        .map_err(AppError::BadRequest)?;

    let generated = generate_token();
    let now = Utc::now();

    let created = AccessTokenRepo::create(
        &state.pool,
        &CreateAccessToken {
            token_hash: generated.hash.clone(),
            token_prefix: generated.prefix.clone(),
            device_id: input.device_id.clone(),
            expires_at: now + chrono::Duration::hours(state.config.token_ttl_hours),
        },
    )
    .await?;

    destination
        .query_pairs_mut()
        .append_pair("token", &generated.plaintext);

    let gate_url = match state.shortlink.shorten(destination.as_str()).await {
        Ok(url) => url,
        Err(e) => {
            // A pending row without a reachable gate URL is an orphan;
            // the caller re-issues, so the row must go now.
            if let Err(del) =
                AccessTokenRepo::delete_by_hash(&state.pool, &generated.hash).await
            {
                tracing::error!(
                    token_prefix = %generated.prefix,
                    error = %del,
                    "Failed to roll back pending token after gate failure",
                );
            }
            return Err(AppError::Upstream(e));
        }
    };

    tracing::info!(
        token_id = created.id,
        token_prefix = %generated.prefix,
        device_id = %input.device_id,
        expires_at = %created.expires_at,
        "Access token issued",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IssueResponse {
                token: generated.plaintext,
                gate_url,
            },
        }),
    ))
}

/// POST /api/v1/keys/validate
///
/// Activate-or-validate: flips a pending token to active on its first
/// legitimate check, then keeps answering the same way until expiry.
/// Safe to repeat -- both the post-redirect activation call and the
/// recurring client cache re-check land here.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<ValidateRequest>,
) -> AppResult<Json<DataResponse<ValidateResponse>>> {
    if !token::is_valid_token(&input.token) || !is_valid_device_id(&input.device_id) {
        return Err(AppError::BadRequest(
            "Invalid token or device id format".into(),
        ));
    }

    let hash = token::hash_token(&input.token);

    let Some(record) = AccessTokenRepo::find_by_hash(&state.pool, &hash).await? else {
        return Ok(invalid());
    };

    // Device binding: a mismatch answers exactly like a miss, so the
    // response never reveals that the token exists for another device.
    if record.device_id != input.device_id {
        tracing::debug!(
            token_prefix = %record.token_prefix,
            "Validation rejected: device mismatch",
        );
        return Ok(invalid());
    }

    let now = Utc::now();
    if record.is_expired(now) {
        return Ok(invalid());
    }

    match record.state {
        TokenState::Revoked => Ok(invalid()),
        TokenState::Active => Ok(valid(record.expires_at)),
        TokenState::Pending => {
            // First legitimate check: the token id only reaches us with
            // a matching device after the browser finished the gate
            // round trip, so activate now.
            let flipped = AccessTokenRepo::activate(&state.pool, &hash).await?;
            if flipped {
                tracing::info!(
                    token_prefix = %record.token_prefix,
                    device_id = %record.device_id,
                    "Access token activated",
                );
                return Ok(valid(record.expires_at));
            }

            // Lost the CAS race. Either a concurrent validation already
            // activated the row (fine) or an operator revoked it between
            // lookup and update; re-read to tell the two apart.
            let current = AccessTokenRepo::find_by_hash(&state.pool, &hash).await?;
            match current {
                Some(t) if t.state == TokenState::Active => Ok(valid(t.expires_at)),
                _ => Ok(invalid()),
            }
        }
    }
}
