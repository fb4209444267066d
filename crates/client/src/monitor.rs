//! Entitlement state machine and revalidation loop.
//!
//! Per device session the state runs `Unknown -> Checking ->
//! { Valid(expires_at) | Invalid }`. A fresh cached entitlement is
//! trusted optimistically for display while the server is consulted in
//! the background; any negative server answer evicts the cache and wins
//! over whatever the UI currently shows. Under-granting beats
//! over-granting.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use adgate_core::types::Timestamp;

use crate::cache::{CachedEntitlement, EntitlementCache};
use crate::config::ClientConfig;
use crate::device::DeviceIdentity;
use crate::error::Result;
use crate::gateway::{AccessGateway, HttpGateway, IssuedKey};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Entitlement state as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitlementState {
    /// No information yet.
    Unknown,
    /// A server check is in flight with no cached answer to show.
    Checking,
    /// Content is unlocked until the given time.
    Valid { expires_at: Timestamp },
    /// No entitlement; content stays locked.
    Invalid,
}

impl EntitlementState {
    /// Whether the UI may show unlocked content in this state.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Device-side entitlement monitor.
///
/// Cheap to clone; all clones observe the same state. The background
/// loop keeps running until [`shutdown`](Self::shutdown) is called.
#[derive(Clone)]
pub struct EntitlementMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    gateway: Arc<dyn AccessGateway>,
    device: DeviceIdentity,
    cache: EntitlementCache,
    state_tx: watch::Sender<EntitlementState>,
    /// Held across every server validation call; a timer tick that
    /// finds it taken is a no-op (single-flight).
    in_flight: Mutex<()>,
    /// Wakes the loop for an immediate re-check.
    recheck: Notify,
    cancel: CancellationToken,
    revalidate_interval: Duration,
}

impl EntitlementMonitor {
    /// Start a monitor with the HTTP gateway from `config`.
    ///
    /// Loads (or creates) the device identity, optimistically applies a
    /// fresh cached entitlement, issues an immediate server check, and
    /// schedules the recurring revalidation loop. Must be called within
    /// a Tokio runtime.
    pub fn start(config: ClientConfig) -> Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&config));
        Self::start_with_gateway(config, gateway)
    }

    /// Start a monitor against any [`AccessGateway`] implementation.
    pub fn start_with_gateway(
        config: ClientConfig,
        gateway: Arc<dyn AccessGateway>,
    ) -> Result<Self> {
        let device = DeviceIdentity::load_or_create(&config.storage_dir)?;
        let cache = EntitlementCache::new(&config.storage_dir);

        // Optimistic startup: show a fresh cached entitlement right away
        // while the first server check is still in flight.
        let initial = match cache.load() {
            Some(cached) => EntitlementState::Valid {
                expires_at: cached.expires_at,
            },
            None => EntitlementState::Unknown,
        };
        let (state_tx, _) = watch::channel(initial);

        let inner = Arc::new(MonitorInner {
            gateway,
            device,
            cache,
            state_tx,
            in_flight: Mutex::new(()),
            recheck: Notify::new(),
            cancel: CancellationToken::new(),
            revalidate_interval: config.revalidate_interval,
        });

        tokio::spawn(run(Arc::clone(&inner)));

        Ok(Self { inner })
    }

    /// Current entitlement state.
    pub fn state(&self) -> EntitlementState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<EntitlementState> {
        self.inner.state_tx.subscribe()
    }

    /// The device id this monitor binds tokens to.
    pub fn device_id(&self) -> &str {
        self.inner.device.id()
    }

    /// Ask the server for a new token and gate URL.
    ///
    /// Does not touch the cache or the state: the token is worthless
    /// until the gate round trip completes and
    /// [`complete_unlock`](Self::complete_unlock) gets a positive
    /// server answer.
    pub async fn request_unlock(&self) -> Result<IssuedKey> {
        self.inner.gateway.issue(self.inner.device.id()).await
    }

    /// Validate a token carried back by the return redirect.
    ///
    /// The cache is only ever written after this server round trip
    /// succeeds; the mere presence of `?token=` in a URL proves
    /// nothing. Returns whether the entitlement was granted.
    pub async fn complete_unlock(&self, token: &str) -> Result<bool> {
        let _guard = self.inner.in_flight.lock().await;
        self.inner.confirm(token).await
    }

    /// Trigger an immediate background re-check of the cached
    /// entitlement.
    pub fn revalidate_now(&self) {
        self.inner.recheck.notify_one();
    }

    /// Stop the background revalidation loop.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Revalidation loop
// ---------------------------------------------------------------------------

/// Drive the revalidation loop until the monitor is shut down.
///
/// Single-threaded cooperative: every server call happens inline here
/// (or inside `complete_unlock`), serialized by the in-flight lock.
async fn run(inner: Arc<MonitorInner>) {
    // Confirm (or dismiss) whatever the cache claims as soon as the
    // loop starts.
    inner.revalidate().await;

    let first_tick = tokio::time::Instant::now() + inner.revalidate_interval;
    let mut ticker = tokio::time::interval_at(first_tick, inner.revalidate_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let deadline = inner.expiry_deadline();
        tokio::select! {
            () = inner.cancel.cancelled() => {
                tracing::debug!("Entitlement monitor stopping");
                break;
            }
            _ = ticker.tick() => {
                inner.revalidate().await;
            }
            () = inner.recheck.notified() => {
                inner.revalidate().await;
            }
            () = sleep_until(deadline) => {
                // The local countdown hit zero: evict promptly instead
                // of waiting for the next interval tick.
                inner.revalidate().await;
            }
        }
    }
}

/// Sleep until `deadline`, or forever when there is none to arm.
async fn sleep_until(deadline: Option<Timestamp>) {
    match deadline {
        Some(at) => {
            let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }
        None => std::future::pending::<()>().await,
    }
}

impl MonitorInner {
    /// The next moment the local countdown reaches zero, if the state
    /// currently shows unlocked content.
    ///
    /// Only armed while strictly in the future, so a server that keeps
    /// answering `valid` with a past expiry cannot spin the loop.
    fn expiry_deadline(&self) -> Option<Timestamp> {
        match &*self.state_tx.borrow() {
            EntitlementState::Valid { expires_at } if *expires_at > Utc::now() => {
                Some(*expires_at)
            }
            _ => None,
        }
    }

    /// Re-confirm the cached entitlement with the server.
    async fn revalidate(&self) {
        // A tick that lands while another call is in flight is a no-op.
        let Ok(_guard) = self.in_flight.try_lock() else {
            return;
        };

        let Some(cached) = self.cache.load() else {
            // Nothing fresh to confirm; the content stays locked.
            self.set_state(EntitlementState::Invalid);
            return;
        };

        if !matches!(*self.state_tx.borrow(), EntitlementState::Valid { .. }) {
            self.set_state(EntitlementState::Checking);
        }

        let _ = self.confirm(&cached.token).await;
    }

    /// One authoritative server round trip for `token`.
    ///
    /// A verdict updates cache and state either way; a transport error
    /// leaves both untouched so the next tick retries.
    async fn confirm(&self, token: &str) -> Result<bool> {
        match self.gateway.validate(token, self.device.id()).await {
            Ok(outcome) if outcome.valid => {
                let Some(expires_at) = outcome.expires_at else {
                    // A healthy server never answers valid without an
                    // expiry; treat it as a negative.
                    tracing::warn!("Server answered valid without an expiry");
                    self.cache.clear();
                    self.set_state(EntitlementState::Invalid);
                    return Ok(false);
                };

                if let Err(e) = self.cache.save(&CachedEntitlement {
                    token: token.to_string(),
                    expires_at,
                }) {
                    tracing::warn!(error = %e, "Failed to persist entitlement cache");
                }
                self.set_state(EntitlementState::Valid { expires_at });
                Ok(true)
            }
            Ok(_) => {
                // Authoritative no: evict regardless of what the UI
                // currently shows.
                self.cache.clear();
                self.set_state(EntitlementState::Invalid);
                Ok(false)
            }
            Err(e) => {
                // A transport failure is not a verdict; the cached
                // state stands until a tick gets through.
                tracing::warn!(error = %e, "Entitlement validation call failed");
                Err(e)
            }
        }
    }

    /// Publish a state change, skipping no-op updates.
    fn set_state(&self, next: EntitlementState) {
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            true
        });
    }
}
