//! Callback-URL allow-list validation.
//!
//! The issuer embeds the token in a destination URL that the gate
//! provider later redirects the user's browser to. Scheme, origin, and
//! path are all checked against the configured allow-list, so the
//! issuance endpoint cannot be turned into an open redirector.

use url::Url;

use crate::config::ServerConfig;

/// Validate a client-supplied callback URL against the allow-list.
///
/// Rules:
/// - must parse as an absolute URL
/// - `https` only, except for localhost during development
/// - origin must be one of `allowed_callback_origins`
/// - path must equal `callback_path` exactly
pub fn validate_callback_url(raw: &str, config: &ServerConfig) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|_| "Malformed callback URL".to_string())?;

    let host = url.host_str().unwrap_or_default();
    let is_localhost = host == "localhost" || host == "127.0.0.1";
    if url.scheme() != "https" && !is_localhost {
        return Err("Callback URL must use HTTPS".into());
    }

    let origin = url.origin().ascii_serialization();
    let allowed = config
        .allowed_callback_origins
        .iter()
        .any(|o| o.trim_end_matches('/') == origin);
    if !allowed {
        return Err("Callback origin is not allowed".into());
    }

    if url.path() != config.callback_path {
        return Err("Callback path is not allowed".into());
    }

    Ok(url)
}
