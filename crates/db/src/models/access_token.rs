//! Access-token entity model and DTOs.

use adgate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Lifecycle state of an access token.
///
/// Created `Pending`; flips to `Active` exactly once, on the first
/// successful validation; forced to `Revoked` only by explicit operator
/// action. There is no transition back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "token_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    Pending,
    Active,
    Revoked,
}

/// A row from the `access_tokens` table.
///
/// `token_hash` is the SHA-256 hex digest of the plaintext token id and
/// is skipped during serialization so it can never leak through an API
/// response.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccessToken {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub token_prefix: String,
    pub device_id: String,
    pub state: TokenState,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub activated_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

impl AccessToken {
    /// Whether the entitlement window has passed at `now`.
    ///
    /// Expiry never mutates the row; expired tokens stay as historical
    /// data and simply keep failing validation.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }
}

/// DTO for inserting a new pending token.
pub struct CreateAccessToken {
    pub token_hash: String,
    pub token_prefix: String,
    pub device_id: String,
    pub expires_at: Timestamp,
}

/// Safe listing shape for operator queries (never exposes the hash).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TokenInfo {
    pub id: DbId,
    pub token_prefix: String,
    pub device_id: String,
    pub state: TokenState,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}
