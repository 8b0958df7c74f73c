//! Fluent construction of an [`ActorSystem`], handling transport wiring.
//!
//! Binding a transport's [`LocalDelivery`] target requires the system's
//! `Arc` to already exist, so construction is necessarily two-phase (see
//! [`crate::transport::in_process`]). This builder hides that choreography
//! behind a single [`ActorSystemBuilder::build`] call for the common
//! in-process cases, while [`ActorSystemBuilder::build_with_transport`]
//! exposes the same wiring for any [`LocalBound`] transport — including a
//! future cluster transport.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::Codec;
use crate::registry::ClusterRegistry;
use crate::transport::{InProcessTransport, LocalBound, LocalDelivery, Transport};

use super::actor_system::ActorSystem;
use super::config::SystemConfig;

/// Builds an [`ActorSystem`] with its transport and optional cluster registry wired in.
#[derive(Default)]
pub struct ActorSystemBuilder {
    config: SystemConfig,
    cluster_registry: Option<Arc<dyn ClusterRegistry>>,
    codec: Option<Arc<Codec>>,
}

impl ActorSystemBuilder {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            cluster_registry: None,
            codec: None,
        }
    }

    /// Attach a cluster registry so `get_by_name` can fall back to a
    /// cluster-wide lookup when no local actor holds the name.
    pub fn with_cluster_registry(mut self, registry: Arc<dyn ClusterRegistry>) -> Self {
        self.cluster_registry = Some(registry);
        self
    }

    /// Attach a codec with decoders pre-registered for the payload types this
    /// system expects to receive from remote `Call`s. Defaults to an empty
    /// [`Codec`] when not supplied.
    pub fn with_codec(mut self, codec: Arc<Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Build using the default in-process, short-circuit transport.
    pub fn build(self) -> Arc<ActorSystem> {
        self.build_with_transport(InProcessTransport::short_circuit())
    }

    /// Build using the in-process, queued transport.
    pub fn build_queued(self) -> Arc<ActorSystem> {
        self.build_with_transport(InProcessTransport::queued())
    }

    /// Build with a caller-supplied transport, completing its `bind_local`
    /// wiring once the system's `Arc` exists.
    pub fn build_with_transport<T>(self, transport: Arc<T>) -> Arc<ActorSystem>
    where
        T: LocalBound + 'static,
    {
        let system = ActorSystem::new(
            self.config,
            Arc::clone(&transport) as Arc<dyn Transport>,
            self.cluster_registry,
            self.codec.unwrap_or_else(|| Arc::new(Codec::new())),
        );
        transport.bind_local(Arc::clone(&system) as Arc<dyn LocalDelivery>);
        system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_default_produces_usable_system() {
        let system = ActorSystemBuilder::new(SystemConfig::default()).build();
        assert_eq!(system.config().node_id, "local");
        assert!(system.list_actors().is_empty());
    }

    #[tokio::test]
    async fn test_build_queued_produces_usable_system() {
        let system = ActorSystemBuilder::new(SystemConfig::default()).build_queued();
        assert!(system.list_actors().is_empty());
    }
}
