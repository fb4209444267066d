//! Access-API gateway: the seam between the client state machine and
//! the HTTP backend.

use async_trait::async_trait;
use serde::Deserialize;

use adgate_core::types::Timestamp;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// A freshly issued key: the plaintext token plus the gate URL the user
/// must click through before the token can be activated.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedKey {
    pub token: String,
    pub gate_url: String,
}

/// Server verdict on a token + device pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

/// Server operations the entitlement monitor depends on.
///
/// Both calls are idempotent server-side; `validate` doubles as the
/// one-time activation after the gate round trip and the recurring
/// cache re-check.
#[async_trait]
pub trait AccessGateway: Send + Sync {
    /// Request a new pending token and gate URL for this device.
    async fn issue(&self, device_id: &str) -> Result<IssuedKey>;

    /// Ask the server whether `token` is valid for this device.
    async fn validate(&self, token: &str, device_id: &str) -> Result<ValidationOutcome>;
}

/// `{ "data": ... }` envelope used by the access API.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// HTTP implementation of [`AccessGateway`].
pub struct HttpGateway {
    client: reqwest::Client,
    api_base: String,
    callback_url: String,
}

impl HttpGateway {
    /// Build a gateway from client configuration, with the request
    /// timeout baked into the underlying HTTP client.
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            callback_url: config.callback_url.clone(),
        }
    }
}

#[async_trait]
impl AccessGateway for HttpGateway {
    async fn issue(&self, device_id: &str) -> Result<IssuedKey> {
        let response = self
            .client
            .post(format!("{}/api/v1/keys/issue", self.api_base))
            .json(&serde_json::json!({
                "device_id": device_id,
                "callback_url": self.callback_url,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Api(response.status().as_u16()));
        }

        let envelope: DataEnvelope<IssuedKey> = response.json().await?;
        Ok(envelope.data)
    }

    async fn validate(&self, token: &str, device_id: &str) -> Result<ValidationOutcome> {
        let response = self
            .client
            .post(format!("{}/api/v1/keys/validate", self.api_base))
            .json(&serde_json::json!({
                "token": token,
                "device_id": device_id,
            }))
            .send()
            .await?;

        // A 2xx with `valid: false` is a definitive negative; anything
        // else is a transport-level failure, not a verdict.
        if !response.status().is_success() {
            return Err(ClientError::Api(response.status().as_u16()));
        }

        let envelope: DataEnvelope<ValidationOutcome> = response.json().await?;
        Ok(envelope.data)
    }
}
