//! # hearth-rt — a lightweight actor runtime for game backends
//!
//! `hearth-rt` gives a game server a small, single-process actor model —
//! mailboxes, handles, request/response calls — that scales out to a
//! cluster of processes and out again to external TCP/WebSocket clients
//! without changing how application code sends a message.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hearth_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! struct Counter {
//!     count: u64,
//! }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("counter actor error")]
//! struct CounterError;
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     type Error = CounterError;
//!
//!     async fn handle(&mut self, _envelope: Envelope, _ctx: &ActorContext) -> Result<Option<Payload>, Self::Error> {
//!         self.count += 1;
//!         Ok(None)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = ActorSystemBuilder::new(SystemConfig::default()).build();
//!     let handle = system
//!         .create(|| Counter { count: 0 }, Some("counter".to_string()), None)
//!         .await
//!         .unwrap();
//!     system.send(handle, Payload::local(()), None).await.unwrap();
//! }
//! ```
//!
//! # Module organization
//!
//! ## Core runtime
//! - [`message`] — handles, envelopes, and the cross-node payload codec
//! - [`mailbox`] — the per-actor FIFO queue and its metrics
//! - [`actor`] — the `Actor` trait, its context, and the mailbox pump
//! - [`system`] — `ActorSystem`: creation, routing, lifecycle
//!
//! ## Distribution
//! - [`transport`] — the pluggable send boundary: in-process or cluster
//! - [`registry`] — the cluster registry contract, static and dynamic
//! - [`cluster`] — the TCP cluster transport and wire protocol
//!
//! ## External clients
//! - [`gateway`] — bridges TCP/WebSocket clients into the actor mesh
//!
//! ## Observability and utilities
//! - [`monitoring`] — the generic `Monitor<E>` abstraction and event types
//! - [`util`] — `SessionId`, ambient trace-id propagation, serde helpers

pub mod actor;
pub mod cluster;
pub mod gateway;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod registry;
pub mod system;
pub mod transport;
pub mod util;

pub use actor::{Actor, ActorContext, DispatchError, Dispatcher};
pub use mailbox::{CallOutcome, MailboxError, MailboxSender};
pub use message::{CallType, Codec, CodecError, Envelope, Handle, HandleAllocator, Payload, RemoteCallFault};
pub use monitoring::{Monitor, MonitoringEvent};
pub use system::{ActorRef, ActorSystem, ActorSystemBuilder, SystemConfig, SystemError};
pub use transport::{LocalBound, LocalDelivery, Transport, TransportError};
