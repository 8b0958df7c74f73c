//! The per-actor mailbox: an unbounded FIFO, single reader, multiple writers.
//!
//! Ordering follows the exact order successful enqueues linearize — no
//! reordering, no priority lanes. Enqueueing increments the actor's
//! queue-length metric before the item is written so a concurrent snapshot
//! never undercounts.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::{mpsc, oneshot};

// Layer 3: Internal module imports
use super::error::MailboxError;
use super::metrics::MetricsEntry;
use crate::message::{Envelope, Payload, RemoteCallFault};

/// What a `Call` sender's response promise ultimately resolves to.
#[derive(Debug)]
pub enum CallOutcome {
    /// The handler returned a response payload.
    Response(Payload),
    /// The mailbox was closed (shutdown) before this item was processed.
    Cancelled,
    /// The handler raised an exception while producing the response.
    Fault(RemoteCallFault),
}

/// One queued item: an envelope plus the promise to fulfil if it came from a `Call`.
pub struct MailboxItem {
    pub envelope: Envelope,
    pub response: Option<oneshot::Sender<CallOutcome>>,
}

impl MailboxItem {
    pub fn new(envelope: Envelope, response: Option<oneshot::Sender<CallOutcome>>) -> Self {
        Self { envelope, response }
    }
}

/// Single-reader half of a mailbox, owned exclusively by the actor's host/pump.
pub struct Mailbox {
    receiver: mpsc::UnboundedReceiver<MailboxItem>,
    metrics: Arc<MetricsEntry>,
}

/// Cloneable writer half; any number of senders may enqueue concurrently.
#[derive(Clone)]
pub struct MailboxSender {
    sender: mpsc::UnboundedSender<MailboxItem>,
    metrics: Arc<MetricsEntry>,
}

impl Mailbox {
    /// Create a fresh mailbox paired with its metrics entry.
    pub fn new(metrics: Arc<MetricsEntry>) -> (Self, MailboxSender) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mailbox = Self {
            receiver,
            metrics: Arc::clone(&metrics),
        };
        let sender = MailboxSender { sender, metrics };
        (mailbox, sender)
    }

    /// Await the next item, recording its dequeue. Returns `None` once the
    /// mailbox is closed and drained.
    pub async fn recv(&mut self) -> Option<MailboxItem> {
        let item = self.receiver.recv().await;
        if item.is_some() {
            self.metrics.record_dequeued();
        }
        item
    }

    /// Drain every item currently buffered without awaiting, so the pump can
    /// "drain all currently available items without yielding the pump slot".
    pub fn drain_available(&mut self) -> Vec<MailboxItem> {
        let mut drained = Vec::new();
        while let Ok(item) = self.receiver.try_recv() {
            self.metrics.record_dequeued();
            drained.push(item);
        }
        drained
    }

    /// Close the channel to new writes, then drain whatever is still buffered
    /// so every in-flight response promise can be resolved with cancellation.
    pub fn close_and_drain(&mut self) -> Vec<MailboxItem> {
        self.receiver.close();
        self.drain_available()
    }
}

impl MailboxSender {
    /// Enqueue an item. Fails only once the mailbox has been destroyed.
    pub fn enqueue(&self, item: MailboxItem) -> Result<(), MailboxError> {
        self.metrics.record_enqueued();
        self.sender.send(item).map_err(|_| {
            self.metrics.record_dequeued();
            MailboxError::Destroyed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CallType, Handle, MessageId};

    fn envelope(payload: Payload) -> Envelope {
        Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            Handle::new(1).unwrap(),
            CallType::Send,
            payload,
            None,
        )
    }

    fn metrics() -> Arc<MetricsEntry> {
        Arc::new(MetricsEntry::new(Handle::new(1).unwrap(), None, "Test"))
    }

    #[tokio::test]
    async fn test_enqueue_and_recv_preserves_order() {
        let (mut mailbox, sender) = Mailbox::new(metrics());
        sender
            .enqueue(MailboxItem::new(envelope(Payload::local(1u32)), None))
            .unwrap();
        sender
            .enqueue(MailboxItem::new(envelope(Payload::local(2u32)), None))
            .unwrap();

        let first = mailbox.recv().await.unwrap();
        let second = mailbox.recv().await.unwrap();
        assert_eq!(first.envelope.payload.downcast::<u32>(), Some(1));
        assert_eq!(second.envelope.payload.downcast::<u32>(), Some(2));
    }

    #[tokio::test]
    async fn test_enqueue_fails_after_mailbox_dropped() {
        let (mailbox, sender) = Mailbox::new(metrics());
        drop(mailbox);
        let result = sender.enqueue(MailboxItem::new(envelope(Payload::local(1u32)), None));
        assert!(matches!(result, Err(MailboxError::Destroyed)));
    }

    #[tokio::test]
    async fn test_drain_available_does_not_await() {
        let (mut mailbox, sender) = Mailbox::new(metrics());
        for i in 0..5u32 {
            sender
                .enqueue(MailboxItem::new(envelope(Payload::local(i)), None))
                .unwrap();
        }
        let drained = mailbox.drain_available();
        assert_eq!(drained.len(), 5);
    }

    #[tokio::test]
    async fn test_close_and_drain_rejects_further_enqueues() {
        let (mut mailbox, sender) = Mailbox::new(metrics());
        sender
            .enqueue(MailboxItem::new(envelope(Payload::local(1u32)), None))
            .unwrap();
        let drained = mailbox.close_and_drain();
        assert_eq!(drained.len(), 1);
        assert!(sender
            .enqueue(MailboxItem::new(envelope(Payload::local(2u32)), None))
            .is_err());
    }

    #[tokio::test]
    async fn test_metrics_track_enqueue_and_dequeue() {
        let metrics = metrics();
        let (mut mailbox, sender) = Mailbox::new(Arc::clone(&metrics));
        sender
            .enqueue(MailboxItem::new(envelope(Payload::local(1u32)), None))
            .unwrap();
        assert_eq!(metrics.snapshot().queue_length, 1);
        mailbox.recv().await;
        assert_eq!(metrics.snapshot().queue_length, 0);
    }
}
