//! Configuration for the adgate client.

use std::path::PathBuf;
use std::time::Duration;

/// Default interval between background revalidation calls.
const DEFAULT_REVALIDATE_INTERVAL: Duration = Duration::from_secs(300);

/// Default timeout for a single API call.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a device-side entitlement client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Access API base URL (e.g. `https://api.example.com`).
    pub api_base: String,
    /// Callback URL on the server's allow-list; the gate redirects the
    /// browser here with `?token=...` appended.
    pub callback_url: String,
    /// Directory holding the persistent device id and entitlement cache.
    pub storage_dir: PathBuf,
    /// How often the cached entitlement is re-confirmed with the server.
    pub revalidate_interval: Duration,
    /// Timeout for a single API call.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with default timings.
    pub fn new(
        api_base: impl Into<String>,
        callback_url: impl Into<String>,
        storage_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            callback_url: callback_url.into(),
            storage_dir: storage_dir.into(),
            revalidate_interval: DEFAULT_REVALIDATE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the background revalidation interval.
    pub fn revalidate_interval(mut self, interval: Duration) -> Self {
        self.revalidate_interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
