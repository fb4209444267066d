//! Device identity: format checks and generation.
//!
//! A device id is 16 random bytes rendered as 32 lowercase hex
//! characters, generated once per installation and persisted locally by
//! the client. Every token issued to that installation is bound to it.
//! The id is a best-effort anti-sharing measure, not a security
//! boundary: a determined client could forge one, and the server never
//! treats it as proof of anything beyond "same installation".

use rand::RngCore;

use crate::hex;

/// Number of random bytes in a device id.
pub const DEVICE_ID_BYTES: usize = 16;

/// Length of a device id in lowercase hex characters.
pub const DEVICE_ID_HEX_LENGTH: usize = DEVICE_ID_BYTES * 2;

/// Generate a new random device id.
pub fn generate_device_id() -> String {
    let mut bytes = [0u8; DEVICE_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(&bytes)
}

/// Check that a candidate device id is exactly 32 lowercase hex characters.
///
/// Malformed ids are rejected before any store lookup.
pub fn is_valid_device_id(candidate: &str) -> bool {
    candidate.len() == DEVICE_ID_HEX_LENGTH && candidate.bytes().all(hex::is_lower_hex_digit)
}
