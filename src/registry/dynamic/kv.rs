//! Pluggable external KV + pub/sub backends for [`super::DynamicRegistry`].

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use crate::message::Handle;
use crate::registry::error::RegistryError;

/// A key-value store with TTL and a "set-if-absent" primitive, sufficient to
/// back the dynamic registry. Implementations are expected to wrap a real
/// external store (etcd, Redis, etc.); [`InMemoryKvStore`] is provided for
/// tests and single-process demos.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `key = value` with `ttl`, but only if `key` is currently absent
    /// (or expired). Returns `true` iff the write happened.
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool, RegistryError>;

    /// Unconditionally write or refresh `key = value` with `ttl`.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), RegistryError>;

    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError>;

    async fn delete(&self, key: &str) -> Result<(), RegistryError>;
}

/// A notification carried over the registry's pub/sub channel, invalidating
/// or priming cache entries on peer nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryNotification {
    /// `service|name|node|handle` — a name now resolves to `(node, handle)`.
    Upsert { name: String, node_id: String, handle: Handle },
    /// `remove|name|handle` — the registration for `name` at `handle` is gone.
    Remove { name: String, handle: Handle },
}

/// Publishes and subscribes to [`RegistryNotification`]s.
#[async_trait]
pub trait PubSub: Send + Sync {
    async fn publish(&self, notification: RegistryNotification) -> Result<(), RegistryError>;

    fn subscribe(&self) -> broadcast::Receiver<RegistryNotification>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`KvStore`] for tests and single-node demos. Expiry is checked
/// lazily on read; there is no background reaper.
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_live(entry: &Entry) -> bool {
        Instant::now() < entry.expires_at
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool, RegistryError> {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(key) {
            if Self::is_live(existing) {
                return Ok(false);
            }
        }
        entries.insert(key.to_string(), Entry { value, expires_at: Instant::now() + ttl });
        Ok(true)
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), RegistryError> {
        self.entries
            .write()
            .insert(key.to_string(), Entry { value, expires_at: Instant::now() + ttl });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError> {
        let entries = self.entries.read();
        Ok(entries.get(key).filter(|e| Self::is_live(e)).map(|e| e.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), RegistryError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// In-process [`PubSub`] built on [`tokio::sync::broadcast`].
pub struct InMemoryPubSub {
    sender: broadcast::Sender<RegistryNotification>,
}

impl InMemoryPubSub {
    pub fn new() -> Arc<Self> {
        let (sender, _) = broadcast::channel(256);
        Arc::new(Self { sender })
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, notification: RegistryNotification) -> Result<(), RegistryError> {
        // No subscribers is not an error — notifications are best-effort.
        let _ = self.sender.send(notification);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryNotification> {
        self.sender.subscribe()
    }
}
