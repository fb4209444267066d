//! Behavioural tests for the entitlement monitor, driven against a
//! programmable in-memory gateway.
//!
//! All tests run with paused time (`start_paused`) so interval and
//! deadline logic executes instantly and deterministically.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use adgate_client::{
    AccessGateway, CachedEntitlement, ClientConfig, ClientError, EntitlementCache,
    EntitlementMonitor, EntitlementState, IssuedKey, ValidationOutcome,
};
use adgate_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Fake gateway
// ---------------------------------------------------------------------------

/// Programmable stand-in for the access API.
struct FakeGateway {
    verdict: Mutex<ValidationOutcome>,
    issued: Mutex<Option<IssuedKey>>,
    /// When set, `validate` fails with a transport-level error instead
    /// of answering.
    unreachable: AtomicBool,
    validate_calls: AtomicUsize,
}

impl FakeGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            verdict: Mutex::new(ValidationOutcome {
                valid: false,
                expires_at: None,
            }),
            issued: Mutex::new(None),
            unreachable: AtomicBool::new(false),
            validate_calls: AtomicUsize::new(0),
        })
    }

    fn grant_until(&self, expires_at: Timestamp) {
        *self.verdict.lock().unwrap() = ValidationOutcome {
            valid: true,
            expires_at: Some(expires_at),
        };
    }

    fn deny(&self) {
        *self.verdict.lock().unwrap() = ValidationOutcome {
            valid: false,
            expires_at: None,
        };
    }

    fn offer(&self, token: &str) {
        *self.issued.lock().unwrap() = Some(IssuedKey {
            token: token.to_string(),
            gate_url: "https://gate.test/go".to_string(),
        });
    }

    fn calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessGateway for FakeGateway {
    async fn issue(&self, _device_id: &str) -> Result<IssuedKey, ClientError> {
        self.issued
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClientError::Api(502))
    }

    async fn validate(
        &self,
        _token: &str,
        _device_id: &str,
    ) -> Result<ValidationOutcome, ClientError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ClientError::Api(500));
        }
        Ok(self.verdict.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config(dir: &tempfile::TempDir) -> ClientConfig {
    ClientConfig::new(
        "http://localhost:0",
        "http://localhost:5173/verify-key",
        dir.path(),
    )
    .revalidate_interval(Duration::from_secs(60))
}

fn seed_cache(dir: &tempfile::TempDir, token: &str, expires_at: Timestamp) {
    EntitlementCache::new(dir.path())
        .save(&CachedEntitlement {
            token: token.to_string(),
            expires_at,
        })
        .unwrap();
}

/// Wait (under paused time) until the observed state satisfies `pred`.
async fn wait_for_state<F>(monitor: &EntitlementMonitor, pred: F) -> EntitlementState
where
    F: Fn(&EntitlementState) -> bool,
{
    let mut rx = monitor.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(600), rx.wait_for(|s| pred(s)))
        .await
        .expect("state change should arrive before the timeout")
        .expect("monitor should still be running");
    state.clone()
}

// ---------------------------------------------------------------------------
// Test: startup paths
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn startup_without_cache_goes_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FakeGateway::new();

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();

    let state = wait_for_state(&monitor, |s| *s != EntitlementState::Unknown).await;
    assert_eq!(state, EntitlementState::Invalid);
    // No cached token means nothing to confirm with the server.
    assert_eq!(gateway.calls(), 0);
    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn fresh_cache_is_optimistic_then_server_confirmed() {
    let dir = tempfile::tempdir().unwrap();
    let cached_expiry = Utc::now() + chrono::Duration::hours(1);
    let server_expiry = Utc::now() + chrono::Duration::hours(2);
    seed_cache(&dir, &"a".repeat(64), cached_expiry);

    let gateway = FakeGateway::new();
    gateway.grant_until(server_expiry);

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();

    // Before the loop ever runs, the cached entitlement already shows.
    assert_eq!(
        monitor.state(),
        EntitlementState::Valid {
            expires_at: cached_expiry
        }
    );

    // The background check then replaces it with the server's expiry.
    let state = wait_for_state(&monitor, |s| {
        matches!(s, EntitlementState::Valid { expires_at } if *expires_at == server_expiry)
    })
    .await;
    assert!(state.is_unlocked());
    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn negative_server_answer_beats_optimistic_cache() {
    let dir = tempfile::tempdir().unwrap();
    seed_cache(&dir, &"a".repeat(64), Utc::now() + chrono::Duration::hours(1));

    let gateway = FakeGateway::new();
    gateway.deny();

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();

    let state = wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;
    assert_eq!(state, EntitlementState::Invalid);

    // The cache was evicted, not just the in-memory state.
    assert!(EntitlementCache::new(dir.path()).load().is_none());
    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn transport_failure_keeps_optimistic_state() {
    let dir = tempfile::tempdir().unwrap();
    let cached_expiry = Utc::now() + chrono::Duration::hours(1);
    seed_cache(&dir, &"a".repeat(64), cached_expiry);

    let gateway = FakeGateway::new();
    gateway.unreachable.store(true, Ordering::SeqCst);

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();

    // Let the first (failing) check happen.
    while gateway.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // No verdict arrived, so the optimistic state stands.
    assert_eq!(
        monitor.state(),
        EntitlementState::Valid {
            expires_at: cached_expiry
        }
    );
    assert!(EntitlementCache::new(dir.path()).load().is_some());
    monitor.shutdown();
}

// ---------------------------------------------------------------------------
// Test: recurring revalidation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn periodic_recheck_picks_up_revocation() {
    let dir = tempfile::tempdir().unwrap();
    seed_cache(&dir, &"a".repeat(64), Utc::now() + chrono::Duration::hours(4));

    let gateway = FakeGateway::new();
    gateway.grant_until(Utc::now() + chrono::Duration::hours(4));

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();
    wait_for_state(&monitor, |s| s.is_unlocked()).await;
    let after_startup = gateway.calls();

    // The operator revokes server-side; the next interval tick notices.
    gateway.deny();
    let state = wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;
    assert_eq!(state, EntitlementState::Invalid);
    assert!(gateway.calls() > after_startup);
    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn revalidate_now_skips_the_interval_wait() {
    let dir = tempfile::tempdir().unwrap();
    seed_cache(&dir, &"a".repeat(64), Utc::now() + chrono::Duration::hours(4));

    let gateway = FakeGateway::new();
    gateway.grant_until(Utc::now() + chrono::Duration::hours(4));

    // An interval so long a timer tick cannot be the trigger.
    let config = test_config(&dir).revalidate_interval(Duration::from_secs(86_400));
    let monitor = EntitlementMonitor::start_with_gateway(config, gateway.clone()).unwrap();
    wait_for_state(&monitor, |s| s.is_unlocked()).await;

    gateway.deny();
    monitor.revalidate_now();

    let state = wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;
    assert_eq!(state, EntitlementState::Invalid);
    monitor.shutdown();
}

// Runs in real time: the expiry deadline is compared against the wall
// clock, so paused time cannot drive it.
#[tokio::test]
async fn countdown_reaching_zero_evicts_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let soon = Utc::now() + chrono::Duration::seconds(2);
    seed_cache(&dir, &"a".repeat(64), soon);

    let gateway = FakeGateway::new();
    gateway.grant_until(soon);

    // Interval far beyond the expiry; only the deadline check can fire
    // within the test window.
    let config = test_config(&dir).revalidate_interval(Duration::from_secs(3600));
    let monitor = EntitlementMonitor::start_with_gateway(config, gateway.clone()).unwrap();
    wait_for_state(&monitor, |s| s.is_unlocked()).await;

    let state = wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;
    assert_eq!(state, EntitlementState::Invalid);
    assert!(EntitlementCache::new(dir.path()).load().is_none());
    monitor.shutdown();
}

// ---------------------------------------------------------------------------
// Test: unlock flow
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn request_unlock_never_touches_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FakeGateway::new();
    gateway.offer(&"b".repeat(64));

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();
    wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;

    let key = monitor.request_unlock().await.unwrap();
    assert_eq!(key.gate_url, "https://gate.test/go");

    // Issuance alone grants nothing.
    assert_eq!(monitor.state(), EntitlementState::Invalid);
    assert!(EntitlementCache::new(dir.path()).load().is_none());
    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn complete_unlock_grants_only_after_server_confirms() {
    let dir = tempfile::tempdir().unwrap();
    let expiry = Utc::now() + chrono::Duration::hours(24);
    let token = "b".repeat(64);

    let gateway = FakeGateway::new();
    gateway.offer(&token);

    let monitor =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();
    wait_for_state(&monitor, |s| *s == EntitlementState::Invalid).await;

    // Server rejects: the UI must stay locked and the cache empty.
    gateway.deny();
    let granted = monitor.complete_unlock(&token).await.unwrap();
    assert!(!granted);
    assert_eq!(monitor.state(), EntitlementState::Invalid);
    assert!(EntitlementCache::new(dir.path()).load().is_none());

    // Server confirms: only now is the cache written and the UI
    // unlocked.
    gateway.grant_until(expiry);
    let granted = monitor.complete_unlock(&token).await.unwrap();
    assert!(granted);
    assert_eq!(
        monitor.state(),
        EntitlementState::Valid { expires_at: expiry }
    );
    let cached = EntitlementCache::new(dir.path()).load().unwrap();
    assert_eq!(cached.token, token);
    assert_eq!(cached.expires_at, expiry);
    monitor.shutdown();
}

// ---------------------------------------------------------------------------
// Test: device identity
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn device_id_is_stable_across_monitors() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FakeGateway::new();

    let first =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();
    let first_id = first.device_id().to_string();
    first.shutdown();

    let second =
        EntitlementMonitor::start_with_gateway(test_config(&dir), gateway.clone()).unwrap();
    assert_eq!(second.device_id(), first_id);
    second.shutdown();
}
