//! Error types for the adgate client.

/// Errors produced by the device-side client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP call to the access API failed (network, DNS, timeout).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The access API answered with an unexpected status code.
    #[error("Access API returned HTTP {0}")]
    Api(u16),

    /// Local storage (device id or cache file) could not be read or
    /// written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
