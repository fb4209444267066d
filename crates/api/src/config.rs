use adgate_core::token::DEFAULT_TOKEN_TTL_HOURS;

/// Server configuration loaded from environment variables.
///
/// All fields have development-friendly defaults except `ADMIN_API_KEY`,
/// which must always be set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Entitlement window in hours, applied at issuance. Fixed per
    /// token: already-issued tokens keep the window they were born with.
    pub token_ttl_hours: i64,
    /// Origins allowed to receive the post-gate redirect callback.
    pub allowed_callback_origins: Vec<String>,
    /// The single path, on an allowed origin, the callback may target.
    pub callback_path: String,
    /// Bearer key required for operator endpoints under `/admin`.
    pub admin_api_key: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                    |
    /// | `TOKEN_TTL_HOURS`          | `24`                    |
    /// | `ALLOWED_CALLBACK_ORIGINS` | `http://localhost:5173` |
    /// | `CALLBACK_PATH`            | `/verify-key`           |
    /// | `ADMIN_API_KEY`            | **required**            |
    ///
    /// # Panics
    ///
    /// Panics if `ADMIN_API_KEY` is missing or empty, or if a numeric
    /// variable fails to parse. Misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_csv(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let token_ttl_hours: i64 = std::env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_HOURS.to_string())
            .parse()
            .expect("TOKEN_TTL_HOURS must be a valid i64");

        let allowed_callback_origins = split_csv(
            &std::env::var("ALLOWED_CALLBACK_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let callback_path =
            std::env::var("CALLBACK_PATH").unwrap_or_else(|_| "/verify-key".into());

        let admin_api_key =
            std::env::var("ADMIN_API_KEY").expect("ADMIN_API_KEY must be set in the environment");
        assert!(!admin_api_key.is_empty(), "ADMIN_API_KEY must not be empty");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            token_ttl_hours,
            allowed_callback_origins,
            callback_path,
            admin_api_key,
        }
    }
}

/// Split a comma-separated env value into trimmed, non-empty entries.
fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
