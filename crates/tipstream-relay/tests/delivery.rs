// End-to-end delivery semantics with mock channels and an in-memory log:
// fanout isolation, drain ordering, and the at-least-once duplicate case.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use tipstream_core::types::{AlertPayload, NotificationRecord};
use tipstream_relay::{
    drain_backlog, fan_out, AlertChannel, ChannelError, ConnectionRegistry, DeliveryLog,
    RelayError,
};

fn payload(identifier: &str, title: &str) -> AlertPayload {
    AlertPayload {
        identifier: identifier.into(),
        title: title.into(),
        text: String::new(),
        source: None,
        timestamp: 0,
        alert_gif: "g".into(),
        alert_audio: "a".into(),
    }
}

/// Records every payload it receives; flips to failing on demand.
struct MockChannel {
    id: Uuid,
    received: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MockChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            received: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        })
    }

    fn failing() -> Arc<Self> {
        let ch = Self::new();
        ch.failing.store(true, Ordering::SeqCst);
        ch
    }

    fn titles(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertChannel for MockChannel {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn send(&self, payload: &AlertPayload) -> Result<(), ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::SendFailed("connection reset".into()));
        }
        self.received.lock().unwrap().push(payload.title.clone());
        Ok(())
    }
}

/// In-memory stand-in for the persistent queue.
#[derive(Default)]
struct MemoryLog {
    records: Mutex<Vec<NotificationRecord>>,
}

impl MemoryLog {
    fn seed(&self, identifier: &str, titles: &[&str]) -> Vec<String> {
        let mut records = self.records.lock().unwrap();
        let mut ids = Vec::new();
        for (i, title) in titles.iter().enumerate() {
            let id = format!("rec-{}", records.len());
            records.push(NotificationRecord {
                id: id.clone(),
                identifier: identifier.into(),
                payload: payload(identifier, title),
                delivered: false,
                created_at: format!("2026-01-01T00:00:0{}Z", i),
                delivered_at: None,
            });
            ids.push(id);
        }
        ids
    }

    fn delivered(&self, id: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.delivered)
            .unwrap_or(false)
    }

    fn mark_count(&self, id: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.id == id && r.delivered)
            .count()
    }
}

#[async_trait]
impl DeliveryLog for MemoryLog {
    async fn mark_delivered(&self, id: &str) -> Result<(), RelayError> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            // idempotent: only the first call flips the flag
            if !record.delivered {
                record.delivered = true;
                record.delivered_at = Some("2026-01-01T00:01:00Z".into());
            }
        }
        Ok(())
    }

    async fn list_undelivered(
        &self,
        identifier: &str,
    ) -> Result<Vec<NotificationRecord>, RelayError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.identifier == identifier && !r.delivered)
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn fanout_reaches_every_live_channel() {
    let registry = ConnectionRegistry::new();
    let log = MemoryLog::default();
    let ids = log.seed("u1", &["Tip ₹5"]);

    let a = MockChannel::new();
    let b = MockChannel::new();
    registry.register("u1", a.clone());
    registry.register("u1", b.clone());

    let delivered = fan_out(&registry, &log, "u1", &payload("u1", "Tip ₹5"), &ids[0]).await;

    assert_eq!(delivered, 2);
    assert_eq!(a.titles(), vec!["Tip ₹5"]);
    assert_eq!(b.titles(), vec!["Tip ₹5"]);
    assert!(log.delivered(&ids[0]));
}

#[tokio::test]
async fn one_failing_channel_does_not_block_the_rest() {
    let registry = ConnectionRegistry::new();
    let log = MemoryLog::default();
    let ids = log.seed("u1", &["Tip ₹5"]);

    let dead = MockChannel::failing();
    let live = MockChannel::new();
    registry.register("u1", dead.clone());
    registry.register("u1", live.clone());

    let delivered = fan_out(&registry, &log, "u1", &payload("u1", "Tip ₹5"), &ids[0]).await;

    assert_eq!(delivered, 1);
    assert_eq!(live.titles(), vec!["Tip ₹5"]);
    // one success is enough to mark the record
    assert!(log.delivered(&ids[0]));
}

#[tokio::test]
async fn all_sends_failing_leaves_the_record_undelivered() {
    let registry = ConnectionRegistry::new();
    let log = MemoryLog::default();
    let ids = log.seed("u3", &["Tip ₹5"]);

    registry.register("u3", MockChannel::failing());

    let delivered = fan_out(&registry, &log, "u3", &payload("u3", "Tip ₹5"), &ids[0]).await;

    assert_eq!(delivered, 0);
    assert!(!log.delivered(&ids[0]));

    // ...and the next connection's drain recovers it.
    let reconnect = MockChannel::new();
    let sent = drain_backlog(&log, reconnect.as_ref(), "u3").await.unwrap();
    assert_eq!(sent, 1);
    assert!(log.delivered(&ids[0]));
}

#[tokio::test]
async fn fanout_with_no_channels_is_a_noop() {
    let registry = ConnectionRegistry::new();
    let log = MemoryLog::default();
    let ids = log.seed("u1", &["Tip ₹5"]);

    let delivered = fan_out(&registry, &log, "u1", &payload("u1", "Tip ₹5"), &ids[0]).await;

    assert_eq!(delivered, 0);
    assert!(!log.delivered(&ids[0]));
}

#[tokio::test]
async fn drain_replays_backlog_in_fifo_order() {
    let log = MemoryLog::default();
    let ids = log.seed("u2", &["first ₹1", "second ₹2", "third ₹3"]);

    let ch = MockChannel::new();
    let sent = drain_backlog(&log, ch.as_ref(), "u2").await.unwrap();

    assert_eq!(sent, 3);
    assert_eq!(ch.titles(), vec!["first ₹1", "second ₹2", "third ₹3"]);
    for id in &ids {
        assert!(log.delivered(id));
    }
}

#[tokio::test]
async fn drain_failure_continues_and_keeps_records_queued() {
    let log = MemoryLog::default();
    let ids = log.seed("u2", &["first ₹1", "second ₹2"]);

    let dead = MockChannel::failing();
    let sent = drain_backlog(&log, dead.as_ref(), "u2").await.unwrap();

    assert_eq!(sent, 0);
    assert!(!log.delivered(&ids[0]));
    assert!(!log.delivered(&ids[1]));

    let pending = log.list_undelivered("u2").await.unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn drain_and_fanout_racing_tolerate_duplicate_delivery() {
    let registry = ConnectionRegistry::new();
    let log = MemoryLog::default();
    let ids = log.seed("u1", &["Tip ₹5"]);

    let ch = MockChannel::new();
    registry.register("u1", ch.clone());

    // Both paths deliver the same record; both call mark_delivered.
    let _ = drain_backlog(&log, ch.as_ref(), "u1").await.unwrap();
    let _ = fan_out(&registry, &log, "u1", &payload("u1", "Tip ₹5"), &ids[0]).await;

    // The client saw the payload twice — at-least-once, not a defect —
    // and the record converged on delivered exactly once.
    assert_eq!(ch.titles(), vec!["Tip ₹5", "Tip ₹5"]);
    assert_eq!(log.mark_count(&ids[0]), 1);
}
