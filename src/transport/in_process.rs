//! The default, same-process transport.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

// Layer 3: Internal module imports
use super::error::TransportError;
use super::traits::{LocalBound, LocalDelivery, Transport};
use crate::mailbox::CallOutcome;
use crate::message::Envelope;

struct QueuedSend {
    envelope: Envelope,
    response: Option<oneshot::Sender<CallOutcome>>,
    cancellation: CancellationToken,
}

enum Mode {
    /// `send` delivers on the caller's own task, synchronously.
    ShortCircuit,
    /// `send` enqueues onto a single-reader dispatch queue; a pump drains it.
    Queued { sender: mpsc::UnboundedSender<QueuedSend> },
}

/// In-process transport. [`InProcessTransport::short_circuit`] is the
/// default; [`InProcessTransport::queued`] trades latency for a single
/// well-ordered dispatch point, matching the single-reader pump style used
/// throughout the mailbox layer.
///
/// The actor system binds itself as the [`LocalDelivery`] target after
/// construction via [`Self::bind_local`] — constructing both at once would
/// require a cyclic `Arc`, which the system avoids by creating the
/// transport first and completing the wiring right after.
pub struct InProcessTransport {
    mode: Mode,
    local: RwLock<Option<Arc<dyn LocalDelivery>>>,
}

impl InProcessTransport {
    pub fn short_circuit() -> Arc<Self> {
        Arc::new(Self { mode: Mode::ShortCircuit, local: RwLock::new(None) })
    }

    pub fn queued() -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let transport = Arc::new(Self { mode: Mode::Queued { sender }, local: RwLock::new(None) });
        tokio::spawn(Self::run_queue(Arc::clone(&transport), receiver));
        transport
    }

    /// Bind the actor system as this transport's local-delivery target.
    pub fn bind_local(&self, local: Arc<dyn LocalDelivery>) {
        *self.local.write() = Some(local);
    }

    fn deliver(&self, envelope: Envelope, response: Option<oneshot::Sender<CallOutcome>>) -> Result<(), TransportError> {
        let to = envelope.to;
        let local = self.local.read().clone();
        match local {
            Some(local) => local.deliver_local(envelope, response),
            None => Err(TransportError::UnknownTarget(to)),
        }
    }

    async fn run_queue(transport: Arc<Self>, mut receiver: mpsc::UnboundedReceiver<QueuedSend>) {
        while let Some(QueuedSend { envelope, response, cancellation }) = receiver.recv().await {
            if cancellation.is_cancelled() {
                if let Some(response) = response {
                    let _ = response.send(CallOutcome::Cancelled);
                }
                continue;
            }
            if let Err(error) = transport.deliver(envelope, response) {
                warn!(%error, "queued in-process delivery failed");
            }
        }
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send(
        &self,
        envelope: Envelope,
        response: Option<oneshot::Sender<CallOutcome>>,
        cancellation: CancellationToken,
    ) -> Result<(), TransportError> {
        if cancellation.is_cancelled() {
            if let Some(response) = response {
                let _ = response.send(CallOutcome::Cancelled);
            }
            return Ok(());
        }
        match &self.mode {
            Mode::ShortCircuit => self.deliver(envelope, response),
            Mode::Queued { sender } => sender
                .send(QueuedSend { envelope, response, cancellation })
                .map_err(|_| TransportError::Cancelled),
        }
    }
}

impl LocalBound for InProcessTransport {
    fn bind_local(&self, local: Arc<dyn LocalDelivery>) {
        InProcessTransport::bind_local(self, local)
    }
}
