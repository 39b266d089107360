//! Integration tests exercising the assembled service:
//! LMDB stores → nomination ledger → reconciler, and the telemetry
//! pipeline from a local feed endpoint through the liveness tracker to
//! the store-backed reporting sink.
//!
//! These tests wire together components that are normally only connected
//! inside `service.rs`, verifying the system works end-to-end — not just
//! in isolation.

use std::time::Duration;

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

use stakewatch_service::{MonitorService, ServiceConfig};
use stakewatch_types::{Candidate, NominatorRegistration, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn base_config(dir: &tempfile::TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.telemetry.enabled = false;
    config
}

fn registration(address: &str, stash: &str) -> NominatorRegistration {
    NominatorRegistration {
        address: address.into(),
        stash: stash.into(),
        proxy: String::new(),
        proxy_delay: 0,
        reward_destination: "Staked".into(),
        bonded: 10_000,
        created_at: Timestamp::new(100),
    }
}

/// A one-client local feed endpoint. Accepts the connection, consumes the
/// subscribe frame, then sends the given frames and holds the socket
/// open.
async fn local_feed(frames: Vec<String>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("ws://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        use futures_util::StreamExt;
        let _subscribe = ws.next().await;
        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }
        // Hold the connection open until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
    });
    endpoint
}

/// Poll `predicate` every 50 ms until it holds or the deadline passes.
async fn wait_until<F: Fn() -> bool>(deadline: Duration, predicate: F) -> bool {
    let started = std::time::Instant::now();
    while started.elapsed() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    predicate()
}

// ---------------------------------------------------------------------------
// 1. Nomination flow over real LMDB stores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nomination_flow_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = MonitorService::new(base_config(&dir)).unwrap();
    service.start().await.unwrap();

    let ledger = service.ledger();
    let candidates = service.candidate_store();

    candidates
        .put_candidate(&Candidate::new("Val2", "S2"))
        .unwrap();
    assert!(ledger.upsert_nominator(registration("N1", "S1")));

    assert!(service.reconciler().apply_nomination("N1", "S2", 50));
    assert_eq!(
        candidates.find_by_stash("S2").unwrap().unwrap().nominated_at,
        Some(50)
    );

    let targets = ledger.current_targets("N1");
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].name, "Val2");
    assert_eq!(service.metrics().nominations_applied_total.get(), 1);

    assert!(ledger.clear_current("N1"));
    assert!(ledger.current_targets("N1").is_empty());

    service.stop().await.unwrap();
}

#[tokio::test]
async fn upsert_and_staleness_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut service = MonitorService::new(base_config(&dir)).unwrap();
        service.start().await.unwrap();
        let ledger = service.ledger();
        ledger.upsert_nominator(registration("n1", "s1"));
        ledger.upsert_nominator(registration("n2", "s2"));
        service.stop().await.unwrap();
    }

    // Reopen the same data dir: documents are still there.
    let mut service = MonitorService::new(base_config(&dir)).unwrap();
    service.start().await.unwrap();
    let ledger = service.ledger();
    assert_eq!(ledger.all_nominators().len(), 2);

    // GC against the active controller set.
    assert!(ledger.remove_stale_nominators(&["n1".to_string()]));
    let remaining = ledger.all_nominators();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].address, "n1");

    service.stop().await.unwrap();
}

// ---------------------------------------------------------------------------
// 2. Telemetry pipeline end-to-end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feed_disconnect_reaches_the_candidate_store() {
    // A zero threshold promotes on the first sweep after the event.
    let endpoint = local_feed(vec![
        r#"{"event":"heartbeat","node":"Val1"}"#.to_string(),
        r#"{"event":"disconnected","node":"Val1"}"#.to_string(),
    ])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(&dir);
    config.telemetry.enabled = true;
    config.telemetry.endpoint = endpoint;
    config.telemetry.offline_threshold_secs = 0;
    config.telemetry.sweep_interval_secs = 1;

    let mut service = MonitorService::new(config).unwrap();
    let candidates = service.candidate_store();
    candidates
        .put_candidate(&Candidate::new("Val1", "S1"))
        .unwrap();

    service.start().await.unwrap();

    let metrics = service.metrics();
    let store = service.candidate_store();
    let marked = wait_until(Duration::from_secs(10), move || {
        store
            .find_by_stash("S1")
            .ok()
            .flatten()
            .map(|c| c.offline_since != Timestamp::EPOCH)
            .unwrap_or(false)
    })
    .await;

    assert!(marked, "offline report never reached the candidate store");
    assert!(metrics.feed_events_total.get() >= 2);
    assert_eq!(metrics.offline_reports_total.get(), 1);
    assert_eq!(metrics.feed_connectivity.get(), 1);

    service.stop().await.unwrap();
    assert_eq!(metrics.feed_connectivity.get(), 0);
}

#[tokio::test]
async fn disabled_feed_starts_and_stops_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = MonitorService::new(base_config(&dir)).unwrap();
    service.start().await.unwrap();

    // No feed, but the rest of the service is alive.
    assert_eq!(service.metrics().feed_connectivity.get(), 0);

    service.stop().await.unwrap();
}
