//! `WebSocket` stream of cycle snapshots.
//!
//! `GET /ws/cycles` upgrades the connection, sends the latest snapshot (if
//! any) straight away, then one JSON text frame per completed cycle. A
//! client that falls behind the broadcast buffer resumes from the newest
//! snapshot. Frames sent by the client are read only to notice a close.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use shdwnet_types::CycleSnapshot;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade the request and start streaming snapshots.
pub async fn ws_cycles(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_cycles(socket, state))
}

async fn stream_cycles(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the latest so no cycle falls in between.
    let mut rx = state.subscribe();
    if let Some(latest) = state.current().latest
        && !send_snapshot(&mut socket, &latest).await
    {
        return;
    }

    loop {
        tokio::select! {
            next = next_snapshot(&mut rx) => {
                let Some(snapshot) = next else {
                    debug!("snapshot channel closed");
                    return;
                };
                if !send_snapshot(&mut socket, &snapshot).await {
                    return;
                }
            }
            incoming = socket.recv() => {
                if matches!(incoming, None | Some(Ok(Message::Close(_)) | Err(_))) {
                    debug!("WebSocket client disconnected");
                    return;
                }
            }
        }
    }
}

/// The next snapshot, skipping past lag. `None` once the channel closes.
async fn next_snapshot(rx: &mut broadcast::Receiver<CycleSnapshot>) -> Option<CycleSnapshot> {
    loop {
        match rx.recv().await {
            Ok(snapshot) => return Some(snapshot),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "WebSocket client lagged"),
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Send one snapshot as a text frame. Returns `false` when the client is
/// gone.
async fn send_snapshot(socket: &mut WebSocket, snapshot: &CycleSnapshot) -> bool {
    let json = match serde_json::to_string(snapshot) {
        Ok(json) => json,
        Err(e) => {
            warn!(cycle_id = %snapshot.cycle_id, "snapshot serialization failed: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
