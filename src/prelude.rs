//! Convenient glob-importable re-exports for building on `hearth-rt`.
//!
//! ```rust
//! use hearth_rt::prelude::*;
//! ```
//!
//! # What's included
//!
//! - Core actor system: [`Actor`], [`ActorContext`], [`ActorLifecycle`], [`ActorState`]
//! - Messaging: [`Handle`], [`Envelope`], [`Payload`], [`CallType`], [`RemoteCallFault`]
//! - Mailbox: [`CallOutcome`], [`MailboxSender`]
//! - System: [`ActorSystem`], [`ActorSystemBuilder`], [`SystemConfig`]
//! - Distribution: [`Transport`], [`ClusterRegistry`], [`ClusterTransport`]
//! - External clients: [`Gateway`], [`GatewayConfig`], [`SessionContext`], [`SessionRouter`]
//! - Monitoring: [`Monitor`], [`MonitoringEvent`], [`EventSeverity`]
//! - Utilities: [`SessionId`]

// Core actor system
pub use crate::actor::{Actor, ActorContext, ActorLifecycle, ActorState};

// Messaging
pub use crate::message::{CallType, Envelope, Handle, Payload, RemoteCallFault};

// Mailbox
pub use crate::mailbox::{CallOutcome, MailboxSender};

// System
pub use crate::system::{ActorRef, ActorSystem, ActorSystemBuilder, SystemConfig, SystemError};

// Distribution
pub use crate::registry::{ClusterRegistry, DynamicRegistry, StaticRegistry};
pub use crate::transport::{LocalBound, LocalDelivery, Transport, TransportError};
pub use crate::cluster::{ClusterError, ClusterTransport, ClusterTransportConfig};

// External clients
pub use crate::gateway::{Gateway, GatewayConfig, GatewayError, SessionContext, SessionRouter};

// Monitoring
pub use crate::monitoring::{EventSeverity, Monitor, MonitoringEvent};

// Utilities
pub use crate::util::SessionId;
