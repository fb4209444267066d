//! Repository for the `access_tokens` table.

use adgate_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::access_token::{AccessToken, CreateAccessToken, TokenInfo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token_hash, token_prefix, device_id, state, \
    issued_at, expires_at, activated_at, revoked_at";

/// Provides persistence operations for access tokens.
pub struct AccessTokenRepo;

impl AccessTokenRepo {
    /// Insert a new pending token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAccessToken,
    ) -> Result<AccessToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_tokens (token_hash, token_prefix, device_id, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessToken>(&query)
            .bind(&input.token_hash)
            .bind(&input.token_prefix)
            .bind(&input.device_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token by the SHA-256 hash of its plaintext id.
    pub async fn find_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_tokens WHERE token_hash = $1");
        sqlx::query_as::<_, AccessToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Atomically flip a pending token to active.
    ///
    /// Compare-and-set on `state = 'pending'`: of two near-simultaneous
    /// activations exactly one updates the row and sees `true`; the
    /// other sees `false` with the row already active, which the
    /// validator treats identically.
    pub async fn activate(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE access_tokens SET state = 'active', activated_at = NOW()
             WHERE token_hash = $1 AND state = 'pending'",
        )
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke a token by row id (operator action). Idempotent: the first
    /// revocation sets `revoked_at`, repeats keep it. Returns the
    /// updated row, or `None` if the id does not exist.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<Option<AccessToken>, sqlx::Error> {
        let query = format!(
            "UPDATE access_tokens
             SET state = 'revoked', revoked_at = COALESCE(revoked_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a token row. Only used to roll back issuance when the
    /// redirect-gate call fails; settled tokens are never deleted this
    /// way. Returns `true` if a row was deleted.
    pub async fn delete_by_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every token ever issued to a device, newest first.
    pub async fn list_by_device(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Vec<TokenInfo>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, token_prefix, device_id, state, issued_at, expires_at
             FROM access_tokens
             WHERE device_id = $1
             ORDER BY issued_at DESC",
        )
        .bind(device_id)
        .fetch_all(pool)
        .await
    }

    /// Delete rows whose expiry is older than `cutoff`. Returns the
    /// count of deleted rows. Used by the retention job only; recently
    /// expired rows are kept as historical data.
    pub async fn purge_expired_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
