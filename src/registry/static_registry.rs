//! Config-driven registry: nodes and service→handle maps fixed at construction.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::RegistryError;
use super::traits::{ActorLocation, ClusterRegistry, NodeDescriptor};
use crate::message::Handle;

/// A registry whose node table is immutable and whose name claims are local
/// bookkeeping only — there is no remote coordination, so a conflicting
/// claim can only come from a name pre-declared (at construction) for a
/// different handle.
#[derive(Debug)]
pub struct StaticRegistry {
    local_node_id: String,
    nodes: HashMap<String, NodeDescriptor>,
    /// Pre-declared `name -> handle` bindings this node is allowed to serve.
    declared: HashMap<String, Handle>,
    /// Live registrations: name -> (node_id, handle).
    live: DashMap<String, ActorLocation>,
    by_handle: DashMap<Handle, ActorLocation>,
}

impl StaticRegistry {
    pub fn new(
        local_node_id: impl Into<String>,
        nodes: HashMap<String, NodeDescriptor>,
        declared: HashMap<String, Handle>,
    ) -> Self {
        Self {
            local_node_id: local_node_id.into(),
            nodes,
            declared,
            live: DashMap::new(),
            by_handle: DashMap::new(),
        }
    }
}

#[async_trait]
impl ClusterRegistry for StaticRegistry {
    fn local_node_id(&self) -> &str {
        &self.local_node_id
    }

    async fn try_resolve_by_name(&self, name: &str) -> Result<Option<ActorLocation>, RegistryError> {
        Ok(self.live.get(name).map(|e| e.value().clone()))
    }

    async fn try_resolve_by_handle(&self, handle: Handle) -> Result<Option<ActorLocation>, RegistryError> {
        Ok(self.by_handle.get(&handle).map(|e| e.value().clone()))
    }

    async fn try_get_node(&self, node_id: &str) -> Result<Option<NodeDescriptor>, RegistryError> {
        Ok(self.nodes.get(node_id).cloned())
    }

    async fn register_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        if let Some(declared_handle) = self.declared.get(name) {
            if *declared_handle != handle {
                return Err(RegistryError::NameTaken {
                    name: name.to_string(),
                    owner: self.local_node_id.clone(),
                });
            }
        }
        if let Some(existing) = self.live.get(name) {
            if existing.node_id != self.local_node_id || existing.handle != handle {
                return Err(RegistryError::NameTaken { name: name.to_string(), owner: existing.node_id.clone() });
            }
        }
        let location = ActorLocation::new(self.local_node_id.clone(), handle);
        self.live.insert(name.to_string(), location.clone());
        self.by_handle.insert(handle, location);
        Ok(())
    }

    async fn unregister_local_actor(&self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        self.live.remove_if(name, |_, location| location.handle == handle);
        self.by_handle.remove_if(&handle, |_, location| location.node_id == self.local_node_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u64) -> Handle {
        Handle::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let registry = StaticRegistry::new("node-a", HashMap::new(), HashMap::new());
        registry.register_local_actor("boss", h(1)).await.unwrap();
        let resolved = registry.try_resolve_by_name("boss").await.unwrap().unwrap();
        assert_eq!(resolved.handle, h(1));
        assert_eq!(resolved.node_id, "node-a");
    }

    #[tokio::test]
    async fn test_declared_name_rejects_other_handle() {
        let mut declared = HashMap::new();
        declared.insert("boss".to_string(), h(1));
        let registry = StaticRegistry::new("node-a", HashMap::new(), declared);
        let result = registry.register_local_actor("boss", h(2)).await;
        assert!(matches!(result, Err(RegistryError::NameTaken { .. })));
    }

    #[tokio::test]
    async fn test_unregister_removes_entry() {
        let registry = StaticRegistry::new("node-a", HashMap::new(), HashMap::new());
        registry.register_local_actor("boss", h(1)).await.unwrap();
        registry.unregister_local_actor("boss", h(1)).await.unwrap();
        assert!(registry.try_resolve_by_name("boss").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_node_lookup() {
        let mut nodes = HashMap::new();
        nodes.insert("node-b".to_string(), NodeDescriptor::new("node-b", "10.0.0.2:9000"));
        let registry = StaticRegistry::new("node-a", nodes, HashMap::new());
        let descriptor = registry.try_get_node("node-b").await.unwrap().unwrap();
        assert_eq!(descriptor.endpoint, "10.0.0.2:9000");
        assert!(registry.try_get_node("node-z").await.unwrap().is_none());
    }
}
