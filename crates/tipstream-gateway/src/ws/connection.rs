//! Per-connection lifecycle for GET /alerts/{identifier}:
//! unvalidated → registered → draining → idle → closed, strictly in that
//! order, with deregistration on every exit path.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::ws::send::{SharedSink, WsChannel};
use tipstream_core::config::CLOSE_UNKNOWN_IDENTIFIER;
use tipstream_relay::AlertChannel;

/// Axum handler — upgrades HTTP to WebSocket at GET /alerts/{identifier}.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, identifier, state))
}

/// Per-connection event loop — lives for the entire WS session.
async fn run_connection(mut socket: WebSocket, identifier: String, state: Arc<AppState>) {
    // Unvalidated: the identity check gates acceptance. Unknown identifiers
    // are refused with a distinct close reason and never registered.
    match state.identities.lookup(&identifier).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            info!(identifier, "refusing channel: unknown identifier");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CLOSE_UNKNOWN_IDENTIFIER,
                    reason: "unknown identifier".into(),
                })))
                .await;
            return;
        }
        Err(e) => {
            warn!(identifier, error = %e, "identity lookup failed; dropping channel");
            return;
        }
    }

    let (tx, mut rx) = socket.split();
    let shared_tx: SharedSink = Arc::new(tokio::sync::Mutex::new(tx));
    let channel: Arc<dyn AlertChannel> = Arc::new(WsChannel::new(shared_tx.clone()));
    let channel_id = channel.id();

    // Registered: from here on, live fanout can reach this channel, and the
    // deregister at the bottom must run on every exit path.
    state.registry.register(&identifier, channel.clone());
    info!(identifier, %channel_id, "channel connected");

    // Draining: replay the undelivered backlog to this channel only, before
    // the idle phase begins. Per-record send failures are absorbed inside
    // drain_backlog; a storage failure is logged and the channel idles anyway.
    match tipstream_relay::drain_backlog(&state.queue, channel.as_ref(), &identifier).await {
        Ok(sent) if sent > 0 => info!(identifier, %channel_id, sent, "backlog drained"),
        Ok(_) => {}
        Err(e) => warn!(identifier, %channel_id, error = %e, "backlog drain failed"),
    }

    // Idle: inbound frames only keep the connection alive — client data is
    // accepted and ignored. Disconnect or a read error ends the state; no
    // server-side timeout exists.
    while let Some(msg) = rx.next().await {
        match msg {
            Ok(Message::Ping(data)) => {
                let mut guard = shared_tx.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(identifier, %channel_id, error = %e, "read error; closing channel");
                break;
            }
        }
    }

    // Closed: cleanup is unconditional.
    state.registry.deregister(&identifier, channel_id);
    info!(identifier, %channel_id, "channel closed");
}
