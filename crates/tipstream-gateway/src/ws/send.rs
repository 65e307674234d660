use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use uuid::Uuid;

use tipstream_core::types::AlertPayload;
use tipstream_relay::{AlertChannel, ChannelError};

/// Write half of a WS connection, shareable between the connection's own
/// drain and live dispatches arriving from ingest tasks.
pub type SharedSink = Arc<tokio::sync::Mutex<SplitSink<WebSocket, Message>>>;

/// One live viewer channel backed by a WebSocket sink.
pub struct WsChannel {
    id: Uuid,
    sink: SharedSink,
}

impl WsChannel {
    pub fn new(sink: SharedSink) -> Self {
        Self {
            id: Uuid::new_v4(),
            sink,
        }
    }
}

#[async_trait]
impl AlertChannel for WsChannel {
    fn id(&self) -> Uuid {
        self.id
    }

    /// Serialize the canonical payload and push it as one text frame.
    /// The sink lock is per-channel, so a slow socket only delays its own
    /// sends, never another viewer's.
    async fn send(&self, payload: &AlertPayload) -> Result<(), ChannelError> {
        let json = serde_json::to_string(payload).map_err(|e| ChannelError::Encode(e.to_string()))?;
        let mut guard = self.sink.lock().await;
        guard
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }
}
