//! The application-supplied router: the gateway's sole extension point.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::actor::ActorContext;

use super::context::SessionContext;
use super::types::{ClientMessage, CloseReason};

/// Application hooks invoked by a session actor over the lifetime of one
/// external client connection.
///
/// A fresh router is constructed per session by [`super::config::RouterFactory`];
/// implementations needing cross-session state should close over an `Arc`
/// shared by every factory invocation.
#[async_trait]
pub trait SessionRouter: Send + Sync {
    /// The connection is established and the session context is ready.
    async fn on_started(&self, _actor_ctx: &ActorContext, _session: &SessionContext) {}

    /// One reassembled inbound message arrived from the client.
    async fn on_message(&self, actor_ctx: &ActorContext, session: &SessionContext, message: ClientMessage);

    /// The session ended, for whatever reason. Called at most once.
    async fn on_closed(&self, _actor_ctx: &ActorContext, _session: &SessionContext, _reason: CloseReason) {}
}
