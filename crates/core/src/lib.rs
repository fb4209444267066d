//! `adgate-core` — domain types shared by the access-token service and
//! the device-side client.
//!
//! This crate has no internal dependencies so both halves of the system
//! (the issuer/validator handlers and the client revalidation layer) can
//! agree on identifier formats, error kinds, and time handling.

pub mod countdown;
pub mod device;
pub mod error;
pub mod token;
pub mod types;

mod hex;
