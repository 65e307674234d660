use thiserror::Error;

/// Errors that can occur on a single channel send.
///
/// Always isolated to the failing channel: the dispatcher and the drain log
/// these and continue, they never abort a broader loop.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The payload could not be serialized for the wire.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// The transport rejected the frame or the peer is gone.
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Errors surfaced by the fanout/drain layer itself.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The delivery log (persistent queue) failed.
    #[error("Storage error: {0}")]
    Storage(String),
}
