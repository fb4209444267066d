//! Access-token generation, hashing, and format validation.
//!
//! A token id is the capability credential: 32 cryptographically random
//! bytes rendered as 64 lowercase hex characters. Only the SHA-256 hex
//! digest of a token is ever persisted server-side; the plaintext is
//! handed to the requesting device exactly once at issuance.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::hex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random bytes in a token id.
pub const TOKEN_BYTES: usize = 32;

/// Length of a token id in lowercase hex characters.
pub const TOKEN_HEX_LENGTH: usize = TOKEN_BYTES * 2;

/// Number of leading characters kept as a loggable prefix.
pub const TOKEN_PREFIX_LENGTH: usize = 8;

/// Default entitlement window in hours, applied at issuance.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Token generation
// ---------------------------------------------------------------------------

/// The result of generating a new access token.
pub struct GeneratedToken {
    /// The plaintext token id (returned to the device once, never stored).
    pub plaintext: String,
    /// The first [`TOKEN_PREFIX_LENGTH`] characters, for logs and display.
    pub prefix: String,
    /// SHA-256 hex digest of the plaintext (the only form persisted).
    pub hash: String,
}

/// Generate a new unguessable access token id.
///
/// 256 bits of entropy makes both brute-force guessing and accidental
/// collision infeasible.
pub fn generate_token() -> GeneratedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext = hex::encode(&bytes);

    let prefix = plaintext[..TOKEN_PREFIX_LENGTH].to_string();
    let hash = hash_token(&plaintext);

    GeneratedToken {
        plaintext,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hex digest of a plaintext token id.
///
/// Used at issuance (to store the digest) and at validation (to look the
/// token up again). A database leak therefore exposes no usable tokens.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Extract the loggable prefix from a plaintext token id.
pub fn token_prefix(token: &str) -> &str {
    &token[..TOKEN_PREFIX_LENGTH.min(token.len())]
}

// ---------------------------------------------------------------------------
// Format validation
// ---------------------------------------------------------------------------

/// Check that a candidate token id is exactly 64 lowercase hex characters.
///
/// Malformed ids are rejected before any store lookup.
pub fn is_valid_token(candidate: &str) -> bool {
    candidate.len() == TOKEN_HEX_LENGTH && candidate.bytes().all(hex::is_lower_hex_digit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
