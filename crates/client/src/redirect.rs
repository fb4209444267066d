//! Return-redirect handling.
//!
//! After the user clicks through the gate, the provider redirects the
//! browser back to the allow-listed callback URL with `?token=...`
//! appended. This module pulls the token back out of that URL.

use adgate_core::token::is_valid_token;

/// Extract the `token` query parameter from a return-redirect URL.
///
/// Presence alone proves nothing -- the caller must still run the token
/// through [`EntitlementMonitor::complete_unlock`] before anything
/// unlocks. Malformed tokens are dropped here so they never reach the
/// server.
///
/// [`EntitlementMonitor::complete_unlock`]: crate::EntitlementMonitor::complete_unlock
pub fn token_from_redirect_url(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw).ok()?;
    let token = url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())?;

    is_valid_token(&token).then_some(token)
}
