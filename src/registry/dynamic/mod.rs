//! The dynamic (KV + pub/sub) cluster registry implementation.

pub mod cache;
pub mod kv;
pub mod registry;

pub use kv::{InMemoryKvStore, InMemoryPubSub, KvStore, PubSub, RegistryNotification};
pub use registry::DynamicRegistry;
