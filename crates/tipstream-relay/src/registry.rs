use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::channel::AlertChannel;

/// In-memory registry of live channels, keyed by identifier.
///
/// One coarse lock guards the map; critical sections are structural mutation
/// or a snapshot copy only — the lock is never held across a send or a
/// storage call. Identity validation happens at the connection boundary
/// before `register` is called, so the registry itself stays a pure
/// structure.
pub struct ConnectionRegistry {
    inner: Mutex<HashMap<String, Vec<Arc<dyn AlertChannel>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Add a channel to the identifier's set.
    pub fn register(&self, identifier: &str, channel: Arc<dyn AlertChannel>) {
        let channel_id = channel.id();
        let mut map = self.inner.lock().unwrap();
        map.entry(identifier.to_string()).or_default().push(channel);
        debug!(identifier, %channel_id, "channel registered");
    }

    /// Remove a channel. When the identifier's set becomes empty the entry
    /// is dropped entirely — the map never accumulates empty sets.
    pub fn deregister(&self, identifier: &str, channel_id: Uuid) {
        let mut map = self.inner.lock().unwrap();
        if let Some(channels) = map.get_mut(identifier) {
            channels.retain(|c| c.id() != channel_id);
            if channels.is_empty() {
                map.remove(identifier);
            }
        }
        debug!(identifier, %channel_id, "channel deregistered");
    }

    /// Point-in-time copy of the identifier's channel set (possibly empty),
    /// taken under the lock, for use outside the lock.
    pub fn snapshot(&self, identifier: &str) -> Vec<Arc<dyn AlertChannel>> {
        let map = self.inner.lock().unwrap();
        map.get(identifier).cloned().unwrap_or_default()
    }

    /// Live channel count for one identifier.
    pub fn connection_count(&self, identifier: &str) -> usize {
        let map = self.inner.lock().unwrap();
        map.get(identifier).map(|v| v.len()).unwrap_or(0)
    }

    /// Per-identifier counts — the health probe's view of the registry.
    pub fn connection_counts(&self) -> HashMap<String, usize> {
        let map = self.inner.lock().unwrap();
        map.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
