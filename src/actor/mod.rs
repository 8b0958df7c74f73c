//! Actors: the `Actor` trait, the per-message context, lifecycle state, and the host pump.
//!
//! An actor is a single-threaded unit of computation whose mailbox is
//! served by exactly one task (the host, see [`host::run`]) at a time. This module defines the trait actors implement and the machinery
//! that drives it; [`crate::system`] owns spawning, registration, and routing.

pub mod context;
pub mod host;
pub mod lifecycle;
pub mod traits;

pub use context::{ActorContext, DispatchError, Dispatcher};
pub use host::HostHandles;
pub use lifecycle::{ActorLifecycle, ActorState};
pub use traits::Actor;
