use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ChannelError;
use tipstream_core::types::AlertPayload;

/// One live delivery channel for a viewer — in production a WebSocket, in
/// tests a mock.
///
/// Implementations must be `Send + Sync` so the registry can hand out
/// snapshots across tasks. `send` takes `&self` so a live dispatch from an
/// ingest task and the connection's own drain can share the channel; any
/// required serialization is the implementation's concern (the WS channel
/// holds its sink behind a `tokio::sync::Mutex`).
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Stable identity of this channel within the registry — used by
    /// `deregister` to remove exactly this channel.
    fn id(&self) -> Uuid;

    /// Deliver one canonical payload, best-effort.
    async fn send(&self, payload: &AlertPayload) -> Result<(), ChannelError>;
}
