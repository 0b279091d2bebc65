//! REST endpoint handlers for the Observer server.
//!
//! All handlers read from the shared [`AppState`]. Nothing is fetched on
//! request: the scheduler pushes each cycle into the state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain HTML status page |
//! | `GET` | `/api/snapshot` | Latest cycle snapshot |
//! | `GET` | `/api/log` | Most recent journal events |
//! | `GET` | `/api/health` | Liveness and cycle counters |

// Handlers read synchronously from the state but axum requires async fns.
#![allow(clippy::unused_async)]

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use shdwnet_types::{CycleSnapshot, RawMetrics};

use crate::error::ObserverError;
use crate::state::AppState;

/// Events returned by `GET /api/log` when no limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Query parameters for the `GET /api/log` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct LogQuery {
    /// Maximum number of events to return (default 100).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- status page
// ---------------------------------------------------------------------------

/// Serve a plain HTML page with the latest signal, sigil, sky and feed
/// health.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.current();
    let cycles = snapshot.cycles_published;
    let body = snapshot
        .latest
        .as_ref()
        .map_or_else(|| "<p>Waiting for the first cycle...</p>\n".to_owned(), render_cycle);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>SHDWNET Observer</title>
    <style>
        body {{
            background: #05070a;
            color: #9fe8c4;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
        }}
        a {{ color: #5fd7ff; }}
        h1 {{ color: #e0e0e0; }}
    </style>
</head>
<body>
    <h1>SHDWNET</h1>
    <p>Cycles published: {cycles}</p>
    {body}
    <h3>API</h3>
    <ul>
        <li><a href="/api/snapshot">/api/snapshot</a></li>
        <li><a href="/api/log">/api/log</a></li>
        <li><a href="/api/health">/api/health</a></li>
        <li>/ws/cycles (WebSocket)</li>
    </ul>
</body>
</html>"#
    ))
}

/// The cycle summary block of the status page.
fn render_cycle(latest: &CycleSnapshot) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<h2>Master Signal: {:.0}% ({:?})</h2>",
        latest.master_signal.percent(),
        latest.tier
    );
    let sky = &latest.celestial;
    let _ = writeln!(
        body,
        "<p>Sigil: {} {} | Moon: {} {}</p>",
        latest.sigil.glyph(),
        latest.sigil.name(),
        sky.moon_phase.glyph(),
        sky.moon_phase.name(),
    );
    let aspects: Vec<String> = sky
        .aspects
        .iter()
        .map(|a| format!("{} {}", a.body.name(), a.kind.glyph()))
        .collect();
    let _ = writeln!(
        body,
        "<p>Aspects ({}): {}</p>",
        sky.aspect_count(),
        if aspects.is_empty() { "none".to_owned() } else { aspects.join(", ") }
    );

    body.push_str("<ul>\n");
    for reading in &latest.readings {
        let detail = match &reading.raw_metrics {
            Some(RawMetrics::SolarXray { flare_class, .. }) => flare_class.label(),
            Some(RawMetrics::KIndex { activity, .. }) => activity.label(),
            _ => "",
        };
        let _ = writeln!(
            body,
            "<li>{}: {:.2} ({:?}) {detail}</li>",
            reading.source.label(),
            reading.normalized_signal,
            reading.status
        );
    }
    body.push_str("</ul>\n");
    let _ = writeln!(body, "<p>Last cycle: {}</p>", latest.cycle_time.to_rfc3339());
    body
}

// ---------------------------------------------------------------------------
// GET /api/snapshot
// ---------------------------------------------------------------------------

/// Return the latest cycle snapshot.
///
/// # Errors
///
/// Returns [`ObserverError::NotFound`] until the first cycle completes.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let latest = state
        .current()
        .latest
        .ok_or_else(|| ObserverError::NotFound("no cycle has completed yet".to_owned()))?;
    Ok(Json(latest))
}

// ---------------------------------------------------------------------------
// GET /api/log
// ---------------------------------------------------------------------------

/// Return the most recent journal events, oldest first.
///
/// # Errors
///
/// Returns [`ObserverError::InvalidQuery`] when `limit` is zero.
pub async fn list_log(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    if limit == 0 {
        return Err(ObserverError::InvalidQuery(
            "limit must be at least 1".to_owned(),
        ));
    }
    let events = state.recent_events(limit);
    Ok(Json(serde_json::json!({
        "count": events.len(),
        "capacity": state.log_capacity(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness, uptime and how many cycles have been published.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.current();
    let last_cycle_at = snapshot.latest.as_ref().map(|s| s.cycle_time);
    let cycles_published = snapshot.cycles_published;

    let uptime_secs = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds()
        .max(0);

    Json(serde_json::json!({
        "status": "ok",
        "cycles_published": cycles_published,
        "last_cycle_at": last_cycle_at,
        "uptime_secs": uptime_secs,
        "ws_clients": state.tx.receiver_count(),
    }))
}
