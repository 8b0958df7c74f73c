//! Cluster registry contract: resolves names and handles to `(node, handle)`
//! locations and owns uniqueness semantics for named services.

pub mod dynamic;
pub mod error;
pub mod static_registry;
pub mod traits;

pub use dynamic::DynamicRegistry;
pub use error::RegistryError;
pub use static_registry::StaticRegistry;
pub use traits::{ActorLocation, ClusterRegistry, NodeDescriptor};
