//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, except for the startup test which binds an
//! ephemeral port.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use shdwnet_core::celestial;
use shdwnet_core::config::PollConfig;
use shdwnet_core::fusion::{FusionEngine, FusionStrategy};
use shdwnet_core::scheduler::{ReadingCollector, Scheduler, ShutdownHandle};
use shdwnet_core::sink::{LogSink, SnapshotSink, Sinks};
use shdwnet_observer::router::build_router;
use shdwnet_observer::server::ServerConfig;
use shdwnet_observer::startup::spawn_observer;
use shdwnet_observer::state::AppState;
use shdwnet_types::{
    CycleId, CycleSnapshot, FeedReading, FeedStatus, GeomagneticActivity, LogEvent, MasterSignal,
    RawMetrics, Severity, Sigil, SignalTier, SourceId, StrategyKind,
};
use tower::ServiceExt;

fn make_snapshot(master: f64) -> CycleSnapshot {
    let at = Utc::now();
    CycleSnapshot {
        cycle_id: CycleId::new(),
        cycle_time: at,
        readings: vec![FeedReading {
            source: SourceId::KIndex,
            raw_metrics: Some(RawMetrics::KIndex {
                k: 3.0,
                activity: GeomagneticActivity::Quiet,
            }),
            normalized_signal: 3.0 / 9.0,
            status: FeedStatus::Ok,
            observed_at: at,
            failure: None,
        }],
        celestial: celestial::compute(at),
        master_signal: MasterSignal::clamped(master),
        tier: SignalTier::Medium,
        strategy: StrategyKind::Weighted,
        sigil: Sigil::Phi,
    }
}

async fn get(state: Arc<AppState>, uri: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let state = Arc::new(AppState::default());
    state.publish(&make_snapshot(0.5));

    let response = get(state, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Master Signal: 50%"));
    assert!(html.contains("K-Index: 0.33 (Ok) Quiet"));
    assert!(html.contains("Aspects ("));
}

#[tokio::test]
async fn test_snapshot_404_before_first_cycle() {
    let response = get(Arc::new(AppState::default()), "/api/snapshot").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
    assert!(json["error"].as_str().unwrap().contains("no cycle"));
}

#[tokio::test]
async fn test_snapshot_returns_latest() {
    let state = Arc::new(AppState::default());
    state.publish(&make_snapshot(0.3));
    let latest = make_snapshot(0.7);
    state.publish(&latest);

    let response = get(state, "/api/snapshot").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cycle_id"], latest.cycle_id.to_string());
    assert!((json["master_signal"].as_f64().unwrap() - 0.7).abs() < 1e-9);
    assert_eq!(json["sigil"], "phi");
    assert_eq!(json["readings"][0]["raw_metrics"]["kind"], "k_index");
}

#[tokio::test]
async fn test_log_defaults_and_limit() {
    let state = Arc::new(AppState::new(500));
    for n in 0..150 {
        state.record(LogEvent::new(format!("event {n}"), Severity::Info, Utc::now()));
    }

    let response = get(Arc::clone(&state), "/api/log").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 100);
    assert_eq!(json["events"][0]["message"], "event 50");
    assert_eq!(json["events"][99]["message"], "event 149");

    let response = get(state, "/api/log?limit=2").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["events"][1]["message"], "event 149");
}

#[tokio::test]
async fn test_log_zero_limit_is_rejected() {
    let response = get(Arc::new(AppState::default()), "/api/log?limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_counts_cycles() {
    let state = Arc::new(AppState::default());
    let response = get(Arc::clone(&state), "/api/health").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["cycles_published"], 0);
    assert!(json["last_cycle_at"].is_null());

    state.publish(&make_snapshot(0.4));
    let response = get(state, "/api/health").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cycles_published"], 1);
    assert!(json["last_cycle_at"].is_string());
}

#[tokio::test]
async fn test_broadcast_channel() {
    let state = AppState::default();
    let mut rx = state.subscribe();

    let snapshot = make_snapshot(0.9);
    state.publish(&snapshot);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.cycle_id, snapshot.cycle_id);
    assert_eq!(received.master_signal, snapshot.master_signal);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let response = get(Arc::new(AppState::default()), "/api/nonexistent").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

struct AllDown;

impl ReadingCollector for AllDown {
    fn collect(&self) -> impl Future<Output = Vec<FeedReading>> + Send {
        async {
            SourceId::ALL
                .into_iter()
                .map(|s| FeedReading::unavailable(s, Utc::now(), "offline".to_owned()))
                .collect()
        }
    }
}

#[tokio::test]
async fn test_scheduler_cycle_reaches_endpoints() {
    let state = Arc::new(AppState::default());
    let sinks = Sinks {
        snapshot: Arc::clone(&state) as Arc<dyn SnapshotSink>,
        log: Arc::clone(&state) as Arc<dyn LogSink>,
        signal: None,
    };
    let engine = FusionEngine::seeded(FusionStrategy::default(), Some(7));
    let scheduler = Scheduler::new(AllDown, engine, sinks, &PollConfig::default());

    let snapshot = scheduler.run_cycle().await.unwrap();

    let response = get(Arc::clone(&state), "/api/snapshot").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cycle_id"], snapshot.cycle_id.to_string());
    assert_eq!(json["readings"].as_array().unwrap().len(), SourceId::ALL.len());

    let response = get(state, "/api/log").await;
    let json = body_to_json(response.into_body()).await;
    let events = json["events"].as_array().unwrap();
    assert_eq!(events[0]["message"], "Polling all data sources...");
    assert_eq!(events[1]["message"], "Solar X-ray feed error");
    assert!(
        events
            .last()
            .unwrap()["message"]
            .as_str()
            .unwrap()
            .starts_with("Master Signal:")
    );
}

#[tokio::test]
async fn test_spawned_observer_stops_on_shutdown() {
    let config = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
    };
    let shutdown = ShutdownHandle::new();
    let (addr, handle) = spawn_observer(&config, Arc::new(AppState::default()), shutdown.clone())
        .await
        .unwrap();
    assert_ne!(addr.port(), 0);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
