//! The session context: what a [`super::router::SessionRouter`] sees of its connection.

// Layer 1: Standard library imports
use std::any::Any;
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use crate::actor::{ActorContext, DispatchError};
use crate::message::{Handle, Payload};

use super::error::GatewayError;
use super::types::{ClientMessage, SessionMetadata};

/// Bound to the system, the session's own handle, the connection, and
/// immutable metadata; handed to every [`super::router::SessionRouter`] hook
/// alongside the [`ActorContext`] that carries the actual send/call capability.
pub struct SessionContext {
    metadata: SessionMetadata,
    write_tx: mpsc::UnboundedSender<ClientMessage>,
    state: DashMap<String, Box<dyn Any + Send + Sync>>,
    bound_actor: Mutex<Option<Handle>>,
}

impl SessionContext {
    pub(crate) fn new(metadata: SessionMetadata, write_tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self {
            metadata,
            write_tx,
            state: DashMap::new(),
            bound_actor: Mutex::new(None),
        }
    }

    /// Immutable per-session identity (session-id, protocol, remote address, connect time).
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// The raw outbound channel, for forwarding a message without wrapping it twice.
    pub(crate) fn write_tx(&self) -> &mpsc::UnboundedSender<ClientMessage> {
        &self.write_tx
    }

    /// Write a binary message to the client.
    pub fn send(&self, bytes: impl Into<bytes::Bytes>) -> Result<(), GatewayError> {
        self.write_tx
            .send(ClientMessage::Binary(bytes.into()))
            .map_err(|_| GatewayError::Dispatch("session connection already closed".to_string()))
    }

    /// Write a text message to the client.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), GatewayError> {
        self.write_tx
            .send(ClientMessage::Text(text.into()))
            .map_err(|_| GatewayError::Dispatch("session connection already closed".to_string()))
    }

    /// Fire-and-forget delivery to another actor, attributed to this session.
    pub async fn forward(&self, actor_ctx: &ActorContext, target: Handle, payload: Payload) -> Result<(), GatewayError> {
        actor_ctx.send(target, payload).await.map_err(dispatch_to_gateway_error)
    }

    /// Request-response call to another actor, on behalf of this session.
    pub async fn call(
        &self,
        actor_ctx: &ActorContext,
        target: Handle,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, GatewayError> {
        actor_ctx.call(target, payload, timeout).await.map_err(dispatch_to_gateway_error)
    }

    /// Record an actor associated with this session, for routing convenience.
    pub fn bind_actor(&self, handle: Handle) {
        *self.bound_actor.lock() = Some(handle);
    }

    /// The actor currently bound to this session, if any.
    pub fn bound_actor(&self) -> Option<Handle> {
        *self.bound_actor.lock()
    }

    /// Stash a typed value under `key` in the per-session state bag.
    pub fn set_state<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.state.insert(key.into(), Box::new(value));
    }

    /// Retrieve a previously stashed value of type `T`, if present and still of that type.
    pub fn get_state<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        self.state.get(key).and_then(|entry| entry.downcast_ref::<T>().cloned())
    }

    /// Remove a previously stashed value.
    pub fn remove_state(&self, key: &str) {
        self.state.remove(key);
    }
}

fn dispatch_to_gateway_error(error: DispatchError) -> GatewayError {
    GatewayError::Dispatch(error.to_string())
}
