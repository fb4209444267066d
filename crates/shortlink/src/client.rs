//! HTTP client for the shortlink provider.

use serde::Deserialize;

use crate::config::ShortlinkConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for shortlink calls.
#[derive(Debug, thiserror::Error)]
pub enum ShortlinkError {
    /// The underlying HTTP request failed (network, DNS, timeout).
    #[error("Shortlink request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Shortlink provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The provider answered 2xx but the payload carried no usable URL.
    #[error("Shortlink provider returned no usable URL")]
    MissingUrl,
}

// ---------------------------------------------------------------------------
// Provider response
// ---------------------------------------------------------------------------

/// Response payload from the provider.
///
/// Field names vary between provider versions; every observed spelling
/// is accepted.
#[derive(Debug, Deserialize)]
struct ShortenResponse {
    status: Option<String>,
    #[serde(rename = "shortenedUrl")]
    shortened_url: Option<String>,
    short_url: Option<String>,
    link: Option<String>,
}

impl ShortenResponse {
    /// Pull the short URL out of whichever field the provider used.
    /// An explicit `status: "error"` wins over any URL field.
    fn into_url(self) -> Option<String> {
        if matches!(self.status.as_deref(), Some("error")) {
            return None;
        }
        self.shortened_url.or(self.short_url).or(self.link)
    }
}

// ---------------------------------------------------------------------------
// ShortlinkClient
// ---------------------------------------------------------------------------

/// Client for the external redirect-gate provider.
pub struct ShortlinkClient {
    client: reqwest::Client,
    config: ShortlinkConfig,
}

impl ShortlinkClient {
    /// Create a client with the timeout from `config` baked into the
    /// underlying HTTP client.
    pub fn new(config: ShortlinkConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Shorten a destination URL through the provider.
    ///
    /// One bounded attempt, no retry: on failure the caller rolls back
    /// the pending token and surfaces the error as retryable, so a
    /// retry here would only stack delays.
    pub async fn shorten(&self, destination: &str) -> Result<String, ShortlinkError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("api", self.config.api_key.as_str()),
                ("url", destination),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShortlinkError::HttpStatus(response.status().as_u16()));
        }

        let payload: ShortenResponse = response.json().await?;
        match payload.into_url() {
            Some(url) => Ok(url),
            None => {
                tracing::warn!("Shortlink provider response carried no URL");
                Err(ShortlinkError::MissingUrl)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
