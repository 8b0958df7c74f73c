//! # Monitoring Module
//!
//! Universal monitoring infrastructure for observing and tracking events across all runtime components.
//!
//! ## Features
//! - **Generic Monitor<E> Trait**: Universal monitoring for any entity type
//! - **Zero-Cost Abstraction**: NoopMonitor compiles away when disabled
//! - **Lock-Free Recording**: Atomic counters for concurrent event tracking
//! - **Type Safety**: MonitoringEvent trait ensures compile-time correctness
//!
//! ## Event Types
//! - `ActorEvent`: Actor lifecycle and message processing
//! - `SystemEvent`: Actor system-level events
//! - `MailboxEvent`: Mailbox queue depth
//! - `TransportEvent`: Cluster transport connection lifecycle
//! - `RegistryEvent`: Cluster registry name claims
//! - `GatewayEvent`: External-client session lifecycle
//!
//! ## Examples
//! ```
//! use hearth_rt::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, ActorEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitoringConfig::default();
//! let monitor = InMemoryMonitor::<ActorEvent>::new(config);
//!
//! let snapshot = monitor.snapshot().await?;
//! assert_eq!(snapshot.total_events, 0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ActorEvent, ActorEventKind, GatewayEvent, GatewayEventKind, MailboxEvent, MailboxEventKind,
    MonitoringConfig, MonitoringSnapshot, RegistryEvent, RegistryEventKind, SystemEvent,
    SystemEventKind, TransportEvent, TransportEventKind,
};
