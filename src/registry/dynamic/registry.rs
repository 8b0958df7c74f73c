//! KV + pub/sub backed cluster registry.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::kv::{KvStore, PubSub, RegistryNotification};
use super::cache::LookupCache;
use crate::message::Handle;
use crate::registry::error::RegistryError;
use crate::registry::traits::{ActorLocation, ClusterRegistry, NodeDescriptor};

fn encode_location(node_id: &str, handle: Handle) -> String {
    format!("{node_id}|{}", handle.get())
}

fn decode_location(value: &str) -> Option<(String, Handle)> {
    let (node_id, raw_handle) = value.split_once('|')?;
    let handle = Handle::new(raw_handle.parse().ok()?)?;
    Some((node_id.to_string(), handle))
}

/// Cluster registry backed by an external KV store and pub/sub channel.
///
/// Each local registration writes three keyed entries — node descriptor,
/// service→location, handle→node — each with [`Self`]'s configured
/// `registration_ttl`, refreshed by a background heartbeat task at a
/// strictly shorter interval. A small per-process [`LookupCache`] fronts the
/// KV store; pub/sub notifications keep it coherent across nodes.
pub struct DynamicRegistry {
    local_node_id: String,
    endpoint: String,
    key_prefix: String,
    kv: Arc<dyn KvStore>,
    pubsub: Arc<dyn PubSub>,
    cache: LookupCache,
    registration_ttl: Duration,
    heartbeat_interval: Duration,
    refreshers: DashMap<(String, Handle), JoinHandle<()>>,
    listener: JoinHandle<()>,
    self_weak: std::sync::Weak<Self>,
}

impl DynamicRegistry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_node_id: impl Into<String>,
        endpoint: impl Into<String>,
        key_prefix: impl Into<String>,
        kv: Arc<dyn KvStore>,
        pubsub: Arc<dyn PubSub>,
        registration_ttl: Duration,
        heartbeat_interval: Duration,
        cache_ttl: Duration,
    ) -> Result<Arc<Self>, RegistryError> {
        if heartbeat_interval >= registration_ttl {
            return Err(RegistryError::InvalidConfig(format!(
                "heartbeat-interval ({heartbeat_interval:?}) must be strictly shorter than registration-ttl ({registration_ttl:?})"
            )));
        }

        let cache = LookupCache::new(cache_ttl);
        let mut subscription = pubsub.subscribe();

        Ok(Arc::new_cyclic(|weak: &std::sync::Weak<Self>| {
            let listener_weak = weak.clone();
            let listener = tokio::spawn(async move {
                while let Ok(notification) = subscription.recv().await {
                    let Some(this) = listener_weak.upgrade() else { break };
                    match notification {
                        RegistryNotification::Upsert { name, node_id, handle } => {
                            this.cache.prime(&name, ActorLocation::new(node_id, handle));
                        }
                        RegistryNotification::Remove { name, .. } => {
                            this.cache.invalidate(&name);
                        }
                    }
                }
            });

            Self {
                local_node_id: local_node_id.into(),
                endpoint: endpoint.into(),
                key_prefix: key_prefix.into(),
                kv,
                pubsub,
                cache,
                registration_ttl,
                heartbeat_interval,
                refreshers: DashMap::new(),
                listener,
                self_weak: weak.clone(),
            }
        }))
    }

    fn service_key(&self, name: &str) -> String {
        format!("{}:services:{name}", self.key_prefix)
    }

    fn handle_key(&self, handle: Handle) -> String {
        format!("{}:handles:{}", self.key_prefix, handle.get())
    }

    fn node_key(&self, node_id: &str) -> String {
        format!("{}:nodes:{node_id}", self.key_prefix)
    }

    fn spawn_refresher(self: &Arc<Self>, name: String, handle: Handle) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.heartbeat_interval);
            ticker.tick().await; // first tick fires immediately; skip it, registration already wrote the keys
            loop {
                ticker.tick().await;
                let value = encode_location(&this.local_node_id, handle);
                if let Err(error) = this.kv.set_with_ttl(&this.service_key(&name), value, this.registration_ttl).await {
                    warn!(%name, %error, "failed to refresh service registration TTL");
                }
                if let Err(error) = this
                    .kv
                    .set_with_ttl(&this.handle_key(handle), this.local_node_id.clone(), this.registration_ttl)
                    .await
                {
                    warn!(%name, %error, "failed to refresh handle registration TTL");
                }
                if let Err(error) = this
                    .kv
                    .set_with_ttl(&this.node_key(&this.local_node_id), this.endpoint.clone(), this.registration_ttl)
                    .await
                {
                    warn!(node = %this.local_node_id, %error, "failed to refresh node descriptor TTL");
                }
            }
        })
    }

    /// Actively delete every local registration and stop background tasks,
    /// rather than waiting for TTL expiry.
    pub async fn shutdown(&self) {
        let keys: Vec<(String, Handle)> = self.refreshers.iter().map(|e| e.key().clone()).collect();
        for (name, handle) in keys {
            let _ = self.unregister_local_actor(&name, handle).await;
        }
        self.listener.abort();
    }
}

#[async_trait]
impl ClusterRegistry for DynamicRegistry {
    fn local_node_id(&self) -> &str {
        &self.local_node_id
    }

    async fn try_resolve_by_name(&self, name: &str) -> Result<Option<ActorLocation>, RegistryError> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Some(cached));
        }
        let Some(raw) = self.kv.get(&self.service_key(name)).await? else {
            return Ok(None);
        };
        let Some((node_id, handle)) = decode_location(&raw) else {
            return Err(RegistryError::Backend(format!("corrupt service record for {name:?}")));
        };
        let location = ActorLocation::new(node_id, handle);
        self.cache.prime(name, location.clone());
        Ok(Some(location))
    }

    async fn try_resolve_by_handle(&self, handle: Handle) -> Result<Option<ActorLocation>, RegistryError> {
        let Some(node_id) = self.kv.get(&self.handle_key(handle)).await? else {
            return Ok(None);
        };
        Ok(Some(ActorLocation::new(node_id, handle)))
    }

    async fn try_get_node(&self, node_id: &str) -> Result<Option<NodeDescriptor>, RegistryError> {
        let Some(endpoint) = self.kv.get(&self.node_key(node_id)).await? else {
            return Ok(None);
        };
        Ok(Some(NodeDescriptor::new(node_id, endpoint)))
    }

    async fn register_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        let value = encode_location(&self.local_node_id, handle);
        let claimed = self.kv.set_if_absent(&self.service_key(name), value, self.registration_ttl).await?;
        if !claimed {
            return Err(RegistryError::NameTaken { name: name.to_string(), owner: "unknown".to_string() });
        }
        self.kv
            .set_with_ttl(&self.handle_key(handle), self.local_node_id.clone(), self.registration_ttl)
            .await?;
        self.kv
            .set_with_ttl(&self.node_key(&self.local_node_id), self.endpoint.clone(), self.registration_ttl)
            .await?;

        self.cache.prime_owned(name, ActorLocation::new(self.local_node_id.clone(), handle));
        self.pubsub
            .publish(RegistryNotification::Upsert { name: name.to_string(), node_id: self.local_node_id.clone(), handle })
            .await?;

        if let Some(this) = self.self_weak.upgrade() {
            let refresher = this.spawn_refresher(name.to_string(), handle);
            self.refreshers.insert((name.to_string(), handle), refresher);
        }

        debug!(%name, %handle, "registered local actor with cluster registry");
        Ok(())
    }

    async fn unregister_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        if let Some((_, refresher)) = self.refreshers.remove(&(name.to_string(), handle)) {
            refresher.abort();
        }
        self.kv.delete(&self.service_key(name)).await?;
        self.kv.delete(&self.handle_key(handle)).await?;
        self.cache.invalidate(name);
        self.pubsub
            .publish(RegistryNotification::Remove { name: name.to_string(), handle })
            .await?;
        Ok(())
    }
}
