//! Transport and local-delivery capabilities.
//!
//! [`Transport`] is what [`crate::system::ActorSystem`] hands envelopes to;
//! [`LocalDelivery`] is the narrow callback transports use to reach back
//! into the actor system's local mailbox lookup without depending on the
//! concrete `ActorSystem` type (same pattern as [`crate::actor::Dispatcher`]).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

// Layer 3: Internal module imports
use super::error::TransportError;
use crate::mailbox::CallOutcome;
use crate::message::Envelope;

/// Accepts an envelope and an optional response promise, and guarantees the
/// promise eventually completes — with success, cancellation, or error.
///
/// `cancellation` is checked before the envelope is actually dispatched; a
/// token already tripped at that point completes `response` with
/// [`CallOutcome::Cancelled`] and drops the envelope without delivering it.
/// Pass [`CancellationToken::new`] when the caller has nothing to cancel on.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        envelope: Envelope,
        response: Option<oneshot::Sender<CallOutcome>>,
        cancellation: CancellationToken,
    ) -> Result<(), TransportError>;
}

/// Looks up the target actor's entry and enqueues onto its mailbox.
///
/// Implemented by [`crate::system::ActorSystem`]; used by both the
/// in-process transport and the TCP cluster transport's inbound path.
pub trait LocalDelivery: Send + Sync {
    fn deliver_local(
        &self,
        envelope: Envelope,
        response: Option<oneshot::Sender<CallOutcome>>,
    ) -> Result<(), TransportError>;
}

/// A transport whose local-delivery target is wired in after construction,
/// once the owning actor system's `Arc` exists. Lets
/// [`crate::system::builder::ActorSystemBuilder`] complete the wiring
/// generically for any transport that needs it.
pub trait LocalBound: Transport {
    fn bind_local(&self, local: std::sync::Arc<dyn LocalDelivery>);
}
