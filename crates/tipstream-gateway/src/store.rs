//! Blocking-storage offload layer.
//!
//! The store crate is synchronous SQLite behind a mutex; every call from
//! async context routes through `spawn_blocking` so the scheduler threads
//! never block on the database. These handles are the only way gateway code
//! touches storage.

use std::sync::Arc;

use async_trait::async_trait;
use tipstream_core::types::{AlertPayload, IdentityProfile, NotificationRecord};
use tipstream_relay::{DeliveryLog, RelayError};
use tipstream_store::{IdentityStore, NotificationQueue, StoreError};

/// Async facade over the identity store.
#[derive(Clone)]
pub struct IdentityHandle {
    inner: Arc<IdentityStore>,
}

impl IdentityHandle {
    pub fn new(store: IdentityStore) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub async fn lookup(&self, identifier: &str) -> Result<Option<IdentityProfile>, StoreError> {
        let store = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        tokio::task::spawn_blocking(move || store.lookup(&identifier))
            .await
            .expect("identity lookup task panicked")
    }
}

/// Async facade over the notification queue; also the production
/// `DeliveryLog` for fanout and drain.
#[derive(Clone)]
pub struct QueueHandle {
    inner: Arc<NotificationQueue>,
}

impl QueueHandle {
    pub fn new(queue: NotificationQueue) -> Self {
        Self {
            inner: Arc::new(queue),
        }
    }

    /// Durably append one canonical payload; returns the assigned record id.
    /// Dispatch for the record must only start after this resolves.
    pub async fn append(&self, payload: AlertPayload) -> Result<String, StoreError> {
        let queue = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || queue.append(&payload))
            .await
            .expect("queue append task panicked")
    }
}

#[async_trait]
impl DeliveryLog for QueueHandle {
    async fn mark_delivered(&self, id: &str) -> Result<(), RelayError> {
        let queue = Arc::clone(&self.inner);
        let id = id.to_string();
        tokio::task::spawn_blocking(move || queue.mark_delivered(&id))
            .await
            .expect("mark_delivered task panicked")
            .map_err(|e| RelayError::Storage(e.to_string()))
    }

    async fn list_undelivered(
        &self,
        identifier: &str,
    ) -> Result<Vec<NotificationRecord>, RelayError> {
        let queue = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        tokio::task::spawn_blocking(move || queue.list_undelivered(&identifier))
            .await
            .expect("list_undelivered task panicked")
            .map_err(|e| RelayError::Storage(e.to_string()))
    }
}
