//! The cluster registry contract.
//!
//! A name resolves to exactly one location at any instant across the
//! cluster; name ownership is exclusive. Both [`super::static_registry::StaticRegistry`]
//! and [`super::dynamic::DynamicRegistry`] satisfy this trait.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::RegistryError;
use crate::message::Handle;

/// `(node-id, handle)` — where one actor currently lives in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorLocation {
    pub node_id: String,
    pub handle: Handle,
}

impl ActorLocation {
    pub fn new(node_id: impl Into<String>, handle: Handle) -> Self {
        Self { node_id: node_id.into(), handle }
    }
}

/// `(node-id, network endpoint)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_id: String,
    pub endpoint: String,
}

impl NodeDescriptor {
    pub fn new(node_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Resolves names and handles to `(node, handle)` pairs and owns uniqueness
/// semantics for named services.
#[async_trait]
pub trait ClusterRegistry: Send + Sync {
    /// Identifier of this process in the cluster.
    fn local_node_id(&self) -> &str;

    /// Global name→location lookup.
    async fn try_resolve_by_name(&self, name: &str) -> Result<Option<ActorLocation>, RegistryError>;

    /// Handle→location lookup.
    async fn try_resolve_by_handle(&self, handle: Handle) -> Result<Option<ActorLocation>, RegistryError>;

    /// Endpoint lookup for a known node.
    async fn try_get_node(&self, node_id: &str) -> Result<Option<NodeDescriptor>, RegistryError>;

    /// Publish that `(name, handle)` lives on this node. Must fail if
    /// another live node already owns the name.
    async fn register_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError>;

    /// Remove a registration made by [`Self::register_local_actor`].
    async fn unregister_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError>;
}
