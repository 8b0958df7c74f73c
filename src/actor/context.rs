//! Per-actor context passed to every lifecycle hook.
//!
//! An actor's hooks never see the [`crate::system::ActorSystem`] directly —
//! only this context, which exposes the actor's own identity plus a narrow,
//! object-safe [`Dispatcher`] capability for sending or calling other actors.
//! Keeping the capability object-safe lets one [`ActorContext`] type serve
//! every actor implementation without a generic system parameter threading
//! through the whole module tree.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// Layer 3: Internal module imports
use crate::message::{Handle, Payload};

/// Failure modes for an outbound send/call issued from within a hook.
#[derive(Debug, Error, Clone)]
pub enum DispatchError {
    #[error("target actor {0} is unknown")]
    UnknownTarget(Handle),
    #[error("call timed out")]
    Timeout,
    #[error("call was cancelled")]
    Cancelled,
    #[error("remote fault: {0}")]
    RemoteFault(String),
    #[error("response payload did not match the expected type")]
    TypeMismatch,
}

impl DispatchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownTarget(_) | Self::TypeMismatch)
    }
}

/// Object-safe handle back into the owning actor system.
///
/// [`crate::system::ActorSystem`] implements this; actors never depend on
/// the system type directly, only on this capability.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch_send(
        &self,
        from: Handle,
        to: Handle,
        payload: Payload,
    ) -> Result<(), DispatchError>;

    async fn dispatch_call(
        &self,
        from: Handle,
        to: Handle,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, DispatchError>;
}

/// Metadata and outbound-messaging capability handed to every [`crate::actor::Actor`] hook.
pub struct ActorContext {
    handle: Handle,
    name: Option<String>,
    created_at: DateTime<Utc>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ActorContext {
    pub fn new(handle: Handle, name: Option<String>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            handle,
            name,
            created_at: Utc::now(),
            dispatcher,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Fire-and-forget delivery to another actor, attributed to this actor.
    pub async fn send(&self, to: Handle, payload: Payload) -> Result<(), DispatchError> {
        self.dispatcher.dispatch_send(self.handle, to, payload).await
    }

    /// Request-response call to another actor, attributed to this actor.
    pub async fn call(
        &self,
        to: Handle,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, DispatchError> {
        self.dispatcher
            .dispatch_call(self.handle, to, payload, timeout)
            .await
    }
}

impl fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish()
    }
}
