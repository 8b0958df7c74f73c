//! Drives one actor's full lifecycle: start hook, serve mailbox in order, stop hook.
//!
//! This is the "pump" — it is spawned once per
//! actor via `tokio::spawn` by [`crate::system::ActorSystem::create`] and
//! owns the only live reference to the actor value. Everything else
//! (registry, senders, metrics) only ever sees the actor's [`crate::message::Handle`].

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Instant;

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::warn;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::traits::Actor;
use crate::mailbox::{CallOutcome, Mailbox, MailboxItem, MetricsEntry};
use crate::message::RemoteCallFault;
use crate::util::trace;

/// Promises fulfilled once the host's start/stop hooks complete.
pub struct HostHandles {
    /// Resolves to `Ok(())` once `on_start` returns, or `Err(message)` if it failed.
    pub startup: oneshot::Receiver<Result<(), String>>,
    /// Resolves once `on_stop` has run and the pump has exited.
    pub stopped: oneshot::Receiver<()>,
}

/// Run `actor` against `mailbox` until `cancel` is tripped.
///
/// Invariants upheld here: at most one handler executes at a time (single
/// task, no concurrent `handle` calls); every item whose enqueue linearized
/// before cancellation is either processed or has its response promise
/// completed with [`CallOutcome::Cancelled`]; the trace scope installed per
/// item is always popped, on every exit path, by [`trace::with_trace_id`].
pub async fn run<A: Actor>(
    mut actor: A,
    ctx: ActorContext,
    mut mailbox: Mailbox,
    cancel: CancellationToken,
    metrics: Arc<MetricsEntry>,
    startup_tx: oneshot::Sender<Result<(), String>>,
    stop_tx: oneshot::Sender<()>,
) {
    if let Err(error) = actor.on_start(&ctx).await {
        let _ = startup_tx.send(Err(error.to_string()));
        let _ = stop_tx.send(());
        return;
    }
    let _ = startup_tx.send(Ok(()));

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = mailbox.recv() => {
                match item {
                    Some(item) => {
                        process_item(&mut actor, &ctx, &metrics, item).await;
                        for extra in mailbox.drain_available() {
                            process_item(&mut actor, &ctx, &metrics, extra).await;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    for leftover in mailbox.close_and_drain() {
        if let Some(response) = leftover.response {
            let _ = response.send(CallOutcome::Cancelled);
        }
    }

    if let Err(error) = actor.on_stop(&ctx).await {
        warn!(handle = %ctx.handle(), %error, "actor stop hook returned an error");
    }
    let _ = stop_tx.send(());
}

async fn process_item<A: Actor>(
    actor: &mut A,
    ctx: &ActorContext,
    metrics: &Arc<MetricsEntry>,
    item: MailboxItem,
) {
    let MailboxItem { envelope, response } = item;
    let trace_id = envelope.trace_id.clone();
    let started = Instant::now();

    let outcome = trace::with_trace_id(trace_id, actor.handle(envelope, ctx)).await;
    let ticks = started.elapsed().as_micros() as u64;
    metrics.record_processed(ticks);

    match outcome {
        Ok(payload) => {
            if let Some(response) = response {
                let outcome = match payload {
                    Some(payload) => CallOutcome::Response(payload),
                    None => CallOutcome::Fault(RemoteCallFault::exception(
                        "MissingResponse",
                        "call handler returned no response payload",
                    )),
                };
                let _ = response.send(outcome);
            }
        }
        Err(error) => {
            metrics.record_exception();
            let message = error.to_string();
            actor.on_error(error, ctx).await;
            if let Some(response) = response {
                let _ = response.send(CallOutcome::Fault(RemoteCallFault::exception(
                    "ActorError",
                    message,
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::context::{DispatchError, Dispatcher};
    use crate::mailbox::Mailbox;
    use crate::message::{CallType, Envelope, Handle, MessageId, Payload};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NullDispatcher;

    #[async_trait]
    impl Dispatcher for NullDispatcher {
        async fn dispatch_send(&self, _from: Handle, to: Handle, _payload: Payload) -> Result<(), DispatchError> {
            Err(DispatchError::UnknownTarget(to))
        }
        async fn dispatch_call(
            &self,
            _from: Handle,
            to: Handle,
            _payload: Payload,
            _timeout: Option<Duration>,
        ) -> Result<Payload, DispatchError> {
            Err(DispatchError::UnknownTarget(to))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct BoomError;

    struct Echo {
        fail_next: bool,
    }

    #[async_trait]
    impl Actor for Echo {
        type Error = BoomError;

        async fn handle(
            &mut self,
            envelope: Envelope,
            _ctx: &ActorContext,
        ) -> Result<Option<Payload>, Self::Error> {
            if self.fail_next {
                return Err(BoomError);
            }
            match envelope.call_type {
                CallType::Call => Ok(Some(envelope.payload)),
                CallType::Send => Ok(None),
            }
        }
    }

    fn spawn_echo(fail_next: bool) -> (
        crate::mailbox::MailboxSender,
        CancellationToken,
        oneshot::Receiver<Result<(), String>>,
        oneshot::Receiver<()>,
    ) {
        let handle = Handle::new(1).unwrap();
        let metrics = Arc::new(MetricsEntry::new(handle, None, "Echo"));
        let (mailbox, sender) = Mailbox::new(Arc::clone(&metrics));
        let ctx = ActorContext::new(handle, None, Arc::new(NullDispatcher));
        let cancel = CancellationToken::new();
        let (startup_tx, startup_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(run(
            Echo { fail_next },
            ctx,
            mailbox,
            cancel.clone(),
            metrics,
            startup_tx,
            stop_tx,
        ));

        (sender, cancel, startup_rx, stop_rx)
    }

    fn envelope(call_type: CallType, payload: Payload) -> Envelope {
        Envelope::new(MessageId::from_raw(1), Handle::NONE, Handle::new(1).unwrap(), call_type, payload, None)
    }

    #[tokio::test]
    async fn test_call_receives_response() {
        let (sender, _cancel, startup, _stop) = spawn_echo(false);
        startup.await.unwrap().unwrap();

        let (response_tx, response_rx) = oneshot::channel();
        sender
            .enqueue(MailboxItem::new(envelope(CallType::Call, Payload::local(42u32)), Some(response_tx)))
            .unwrap();

        match response_rx.await.unwrap() {
            CallOutcome::Response(payload) => assert_eq!(payload.downcast::<u32>(), Some(42)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handler_error_faults_response_without_stopping_pump() {
        let (sender, _cancel, startup, _stop) = spawn_echo(true);
        startup.await.unwrap().unwrap();

        let (response_tx, response_rx) = oneshot::channel();
        sender
            .enqueue(MailboxItem::new(envelope(CallType::Call, Payload::local(1u32)), Some(response_tx)))
            .unwrap();

        match response_rx.await.unwrap() {
            CallOutcome::Fault(fault) => assert_eq!(fault.type_tag, "ActorError"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_resolves_pending_call_with_cancelled() {
        let handle = Handle::new(1).unwrap();
        let metrics = Arc::new(MetricsEntry::new(handle, None, "Echo"));
        let (mailbox, sender) = Mailbox::new(Arc::clone(&metrics));
        let ctx = ActorContext::new(handle, None, Arc::new(NullDispatcher));
        let cancel = CancellationToken::new();
        let (startup_tx, startup_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        // Never drain: cancel immediately so the enqueued item is drained-and-cancelled.
        cancel.cancel();
        tokio::spawn(run(
            Echo { fail_next: false },
            ctx,
            mailbox,
            cancel,
            metrics,
            startup_tx,
            stop_tx,
        ));
        startup_rx.await.unwrap().unwrap();

        let (response_tx, response_rx) = oneshot::channel();
        let _ = sender.enqueue(MailboxItem::new(envelope(CallType::Call, Payload::local(1u32)), Some(response_tx)));

        stop_rx.await.unwrap();
        if let Ok(outcome) = response_rx.await {
            assert!(matches!(outcome, CallOutcome::Cancelled));
        }
    }

    #[tokio::test]
    async fn test_failed_start_hook_skips_mailbox_service() {
        struct NeverStarts;
        #[async_trait]
        impl Actor for NeverStarts {
            type Error = BoomError;
            async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
                Err(BoomError)
            }
            async fn handle(&mut self, envelope: Envelope, _ctx: &ActorContext) -> Result<Option<Payload>, Self::Error> {
                Ok(Some(envelope.payload))
            }
        }

        let handle = Handle::new(1).unwrap();
        let metrics = Arc::new(MetricsEntry::new(handle, None, "NeverStarts"));
        let (mailbox, _sender) = Mailbox::new(Arc::clone(&metrics));
        let ctx = ActorContext::new(handle, None, Arc::new(NullDispatcher));
        let cancel = CancellationToken::new();
        let (startup_tx, startup_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(run(NeverStarts, ctx, mailbox, cancel, metrics, startup_tx, stop_tx));

        assert!(startup_rx.await.unwrap().is_err());
        stop_rx.await.unwrap();
    }
}
