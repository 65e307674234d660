//! Fanout and backlog drain — the two delivery paths.
//!
//! Both call the idempotent `mark_delivered` independently; when a drain and
//! a live dispatch race on the same identifier a client can receive the same
//! payload twice. That is the at-least-once contract working as intended —
//! do not add cross-path synchronization here.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::channel::AlertChannel;
use crate::error::RelayError;
use crate::registry::ConnectionRegistry;
use tipstream_core::types::{AlertPayload, NotificationRecord};

/// The slice of the persistent queue the delivery paths need. Implemented by
/// the gateway's blocking-offload facade in production and by an in-memory
/// log in tests.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    async fn mark_delivered(&self, id: &str) -> Result<(), RelayError>;
    async fn list_undelivered(&self, identifier: &str) -> Result<Vec<NotificationRecord>, RelayError>;
}

/// Push a freshly persisted payload to every live channel for `identifier`.
///
/// Each send is best-effort with an explicit outcome; one channel's failure
/// never prevents attempts on the rest. The record is marked delivered when
/// at least one send succeeded; with zero channels or all sends failing it
/// stays undelivered for a later drain. A mark failure is logged and
/// swallowed — the record is simply drained again later.
///
/// Returns the number of successful sends.
pub async fn fan_out(
    registry: &ConnectionRegistry,
    log: &dyn DeliveryLog,
    identifier: &str,
    payload: &AlertPayload,
    record_id: &str,
) -> usize {
    let channels = registry.snapshot(identifier);
    if channels.is_empty() {
        debug!(identifier, record_id, "no live channels; record left for drain");
        return 0;
    }

    let mut delivered = 0usize;
    for channel in &channels {
        match channel.send(payload).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                warn!(identifier, channel_id = %channel.id(), error = %e, "send failed during fanout");
            }
        }
    }

    if delivered > 0 {
        if let Err(e) = log.mark_delivered(record_id).await {
            warn!(record_id, error = %e, "mark_delivered failed after fanout");
        }
    }
    debug!(identifier, record_id, delivered, attempted = channels.len(), "fanout complete");
    delivered
}

/// Replay the undelivered backlog to one newly connected channel, FIFO.
///
/// Only the new channel is notified — siblings already received live
/// dispatches. A failed send does not abort the loop: once the connection is
/// dead the remaining sends fail harmlessly as no-ops, and the records stay
/// queued for the next connection.
///
/// Returns the number of records delivered to this channel.
pub async fn drain_backlog(
    log: &dyn DeliveryLog,
    channel: &dyn AlertChannel,
    identifier: &str,
) -> Result<usize, RelayError> {
    let pending = log.list_undelivered(identifier).await?;
    if pending.is_empty() {
        return Ok(0);
    }
    debug!(identifier, backlog = pending.len(), "draining backlog");

    let mut sent = 0usize;
    for record in &pending {
        match channel.send(&record.payload).await {
            Ok(()) => {
                if let Err(e) = log.mark_delivered(&record.id).await {
                    warn!(record_id = %record.id, error = %e, "mark_delivered failed during drain");
                }
                sent += 1;
            }
            Err(e) => {
                debug!(record_id = %record.id, error = %e, "send failed during drain; continuing");
            }
        }
    }
    Ok(sent)
}
