use std::sync::Arc;

use adgate_shortlink::ShortlinkClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable. The handlers hold no cross-request state of their
/// own -- everything durable lives in the token store -- so replicas of
/// this service need nothing beyond store-level atomicity.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: adgate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// External redirect-gate client.
    pub shortlink: Arc<ShortlinkClient>,
}
