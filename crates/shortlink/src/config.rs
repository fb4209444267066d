//! Shortlink provider configuration.

use std::time::Duration;

/// Default bound on a single `shorten` call.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default provider endpoint.
const DEFAULT_API_URL: &str = "https://vplink.in/api";

/// Configuration for the external shortlink provider.
#[derive(Debug, Clone)]
pub struct ShortlinkConfig {
    /// Provider API endpoint.
    pub api_url: String,
    /// Provider API key, sent as the `api` query parameter.
    pub api_key: String,
    /// Bound on how long a single `shorten` call may take.
    pub request_timeout: Duration,
}

impl ShortlinkConfig {
    /// Build a config directly. Tests point this at a local mock
    /// provider instead of the real endpoint.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the per-call timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load provider configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                 |
    /// |--------------------------|----------|-------------------------|
    /// | `SHORTLINK_API_URL`      | no       | `https://vplink.in/api` |
    /// | `SHORTLINK_API_KEY`      | **yes**  | --                      |
    /// | `SHORTLINK_TIMEOUT_SECS` | no       | `10`                    |
    ///
    /// # Panics
    ///
    /// Panics if `SHORTLINK_API_KEY` is not set or empty. Provider
    /// misconfiguration should surface at startup, not on the first
    /// issuance.
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("SHORTLINK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let api_key = std::env::var("SHORTLINK_API_KEY")
            .expect("SHORTLINK_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "SHORTLINK_API_KEY must not be empty");

        let timeout_secs: u64 = std::env::var("SHORTLINK_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("SHORTLINK_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
