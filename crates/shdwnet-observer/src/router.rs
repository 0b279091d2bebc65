//! Axum router construction for the Observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- HTML status page
/// - `GET /ws/cycles` -- `WebSocket` snapshot stream
/// - `GET /api/snapshot` -- latest cycle snapshot
/// - `GET /api/log` -- recent journal events
/// - `GET /api/health` -- liveness
///
/// CORS allows any origin so a separately served dashboard can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/cycles", get(ws::ws_cycles))
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/log", get(handlers::list_log))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
