//! Periodic purge of long-expired token rows.
//!
//! Expired tokens stay in the store as historical data -- validation
//! keeps reporting them invalid either way -- but rows whose expiry is
//! more than the retention window in the past carry no information the
//! operator surface still needs. A background task deletes them on a
//! fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use adgate_db::repositories::AccessTokenRepo;

/// Default retention window: 30 days past expiry.
const DEFAULT_RETENTION_DAYS: i64 = 30;

/// How often the purge job runs.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the token retention loop.
///
/// Deletes rows whose `expires_at` is older than `TOKEN_RETENTION_DAYS`
/// (defaults to 30). Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let retention_days: i64 = std::env::var("TOKEN_RETENTION_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETENTION_DAYS);

    tracing::info!(
        retention_days,
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Token retention job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match AccessTokenRepo::purge_expired_before(&pool, cutoff).await {
                    Ok(purged) => {
                        if purged > 0 {
                            tracing::info!(purged, "Token retention: purged old rows");
                        } else {
                            tracing::debug!("Token retention: no rows to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Token retention: purge failed");
                    }
                }
            }
        }
    }
}
