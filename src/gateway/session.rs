//! The session actor: owns one external client connection end-to-end.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

// Layer 3: Internal module imports
use crate::actor::{Actor, ActorContext};
use crate::message::{Envelope, Handle, Payload};

use super::context::SessionContext;
use super::error::GatewayError;
use super::router::SessionRouter;
use super::types::{ActivityTracker, ClientMessage, CloseReason, SessionMetadata};

/// Messages a session actor's mailbox accepts. Everything else is a [`GatewayError::UnexpectedPayload`].
pub(crate) enum SessionMessage {
    /// One reassembled message read from the client.
    Inbound(ClientMessage),
    /// A message another actor wants written to the client.
    Outbound(ClientMessage),
    /// The connection is ending; `reason` says why.
    Close(CloseReason),
}

/// Drives one client connection's lifecycle: start hook wires the router in,
/// `handle` dispatches the three message kinds above, stop hook guarantees
/// `on_closed` fires exactly once even if the actor is killed directly.
pub(crate) struct SessionActor {
    router: Arc<dyn SessionRouter>,
    session_ctx: SessionContext,
    kill_tx: mpsc::UnboundedSender<Handle>,
    activity: Arc<ActivityTracker>,
    closed: bool,
}

impl SessionActor {
    pub(crate) fn new(
        router: Arc<dyn SessionRouter>,
        metadata: SessionMetadata,
        write_tx: mpsc::UnboundedSender<ClientMessage>,
        kill_tx: mpsc::UnboundedSender<Handle>,
        activity: Arc<ActivityTracker>,
    ) -> Self {
        Self {
            router,
            session_ctx: SessionContext::new(metadata, write_tx),
            kill_tx,
            activity,
            closed: false,
        }
    }

    async fn close(&mut self, ctx: &ActorContext, reason: CloseReason) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!(session_id = %self.session_ctx.metadata().session_id, %reason, "session closing");
        self.router.on_closed(ctx, &self.session_ctx, reason).await;
        let _ = self.kill_tx.send(ctx.handle());
    }
}

#[async_trait]
impl Actor for SessionActor {
    type Error = GatewayError;

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.router.on_started(ctx, &self.session_ctx).await;
        Ok(())
    }

    async fn handle(&mut self, envelope: Envelope, ctx: &ActorContext) -> Result<Option<Payload>, Self::Error> {
        let Some(message) = envelope.payload.downcast::<SessionMessage>() else {
            return Err(GatewayError::UnexpectedPayload);
        };
        match message {
            SessionMessage::Inbound(client_message) => {
                self.activity.touch();
                self.router.on_message(ctx, &self.session_ctx, client_message).await;
                Ok(None)
            }
            SessionMessage::Outbound(client_message) => {
                self.activity.touch();
                let _ = self.session_ctx.write_tx().send(client_message);
                Ok(None)
            }
            SessionMessage::Close(reason) => {
                self.close(ctx, reason).await;
                Ok(None)
            }
        }
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        self.close(ctx, CloseReason::ClientDisconnected).await;
        Ok(())
    }
}
