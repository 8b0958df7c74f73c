//! The actor system: actor table, name index, routing, and lifecycle.
//!
//! [`ActorSystem`] is the coordinator every other piece of the runtime core
//! answers to. It owns the live actor table and name index, the message-id
//! generator, the configured [`Transport`], an optional [`ClusterRegistry`],
//! and the [`MetricsRegistry`]. It implements both [`Dispatcher`] (so an
//! actor's own hooks can send/call through [`ActorContext`]) and
//! [`LocalDelivery`] (so a transport — in-process or cluster — can hand it
//! an inbound envelope), following the same narrow-capability pattern
//! [`crate::actor::context`] documents.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use crate::actor::{host, Actor, ActorContext, DispatchError, Dispatcher};
use crate::mailbox::{CallOutcome, Mailbox, MailboxItem, MailboxSender, MetricsRegistry};
use crate::message::{CallType, Codec, Envelope, Handle, HandleAllocator, MessageIdGenerator, Payload, RemoteCallFault};
use crate::registry::ClusterRegistry;
use crate::transport::{LocalDelivery, Transport, TransportError};

use super::config::SystemConfig;
use super::errors::SystemError;

/// Point-in-time description of one registered actor; returned by the
/// lookup and listing operations.
#[derive(Debug, Clone)]
pub struct ActorRef {
    pub handle: Handle,
    pub name: Option<String>,
    pub implementation_tag: String,
}

struct ActorEntry {
    handle: Handle,
    name: Option<String>,
    implementation_tag: String,
    sender: MailboxSender,
    cancel: CancellationToken,
    stopped: AsyncMutex<Option<oneshot::Receiver<()>>>,
}

impl ActorEntry {
    fn as_ref(&self) -> ActorRef {
        ActorRef {
            handle: self.handle,
            name: self.name.clone(),
            implementation_tag: self.implementation_tag.clone(),
        }
    }
}

/// The actor system: coordinator, router, and registry.
pub struct ActorSystem {
    config: SystemConfig,
    handle_allocator: HandleAllocator,
    message_ids: MessageIdGenerator,
    actors: DashMap<Handle, Arc<ActorEntry>>,
    names: DashMap<String, Handle>,
    metrics: MetricsRegistry,
    transport: Arc<dyn Transport>,
    cluster_registry: Option<Arc<dyn ClusterRegistry>>,
    codec: Arc<Codec>,
    shutting_down: AtomicBool,
    shutdown_token: CancellationToken,
}

impl ActorSystem {
    /// Construct a system bound to `transport`. Callers typically reach this
    /// through [`super::builder::ActorSystemBuilder`], which also performs
    /// the transport's `bind_local` wiring once this `Arc` exists.
    pub fn new(
        config: SystemConfig,
        transport: Arc<dyn Transport>,
        cluster_registry: Option<Arc<dyn ClusterRegistry>>,
        codec: Arc<Codec>,
    ) -> Arc<Self> {
        Arc::new(Self {
            handle_allocator: HandleAllocator::new(config.handle_offset),
            message_ids: MessageIdGenerator::new(),
            actors: DashMap::new(),
            names: DashMap::new(),
            metrics: MetricsRegistry::new(),
            transport,
            cluster_registry,
            codec,
            shutting_down: AtomicBool::new(false),
            shutdown_token: CancellationToken::new(),
            config,
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// The codec used to decode cross-node `Call` responses before they are
    /// downcast to the caller's expected type. Register a payload type's
    /// decoder here before a remote node can reply with it.
    pub fn codec(&self) -> &Arc<Codec> {
        &self.codec
    }

    /// Spawn and register a new actor, awaiting its start hook.
    pub async fn create<A: Actor>(
        self: &Arc<Self>,
        factory: impl FnOnce() -> A + Send + 'static,
        name: Option<String>,
        handle_override: Option<Handle>,
    ) -> Result<Handle, SystemError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(SystemError::ShuttingDown);
        }
        if self.config.max_actors != 0 && self.actors.len() >= self.config.max_actors {
            return Err(SystemError::ActorLimitExceeded {
                current: self.actors.len(),
                max: self.config.max_actors,
            });
        }

        let handle = match handle_override {
            Some(handle) => {
                if self.actors.contains_key(&handle) {
                    return Err(SystemError::HandleInUse(handle));
                }
                handle
            }
            None => self.handle_allocator.allocate(),
        };

        if let Some(name) = &name {
            match self.names.entry(name.clone()) {
                Entry::Occupied(_) => return Err(SystemError::NameTaken(name.clone())),
                Entry::Vacant(slot) => {
                    slot.insert(handle);
                }
            }
        }

        let actor = factory();
        let implementation_tag = std::any::type_name::<A>().to_string();
        let metrics_entry = self.metrics.register(handle, name.clone(), implementation_tag.clone());
        let (mailbox, sender) = Mailbox::new(Arc::clone(&metrics_entry));
        let dispatcher: Arc<dyn Dispatcher> = Arc::clone(self) as Arc<dyn Dispatcher>;
        let ctx = ActorContext::new(handle, name.clone(), dispatcher);
        let cancel = CancellationToken::new();
        let (startup_tx, startup_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(host::run(actor, ctx, mailbox, cancel.clone(), metrics_entry, startup_tx, stop_tx));

        let startup_result = match tokio::time::timeout(self.config.spawn_timeout, startup_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err("start hook task dropped its promise".to_string()),
            Err(_) => Err(format!("start hook exceeded {:?}", self.config.spawn_timeout)),
        };

        if let Err(message) = startup_result {
            if let Some(name) = &name {
                self.names.remove(name);
            }
            self.metrics.unregister(handle);
            cancel.cancel();
            warn!(%handle, %message, "actor start hook failed, rolled back");
            return Err(SystemError::StartFailed(message));
        }

        if let (Some(registry), Some(name)) = (&self.cluster_registry, &name) {
            if let Err(error) = registry.register_local_actor(name, handle).await {
                self.names.remove(name);
                self.metrics.unregister(handle);
                cancel.cancel();
                let _ = stop_rx.await;
                warn!(%handle, %name, %error, "cluster name claim rejected, rolled back local registration");
                return Err(SystemError::ClusterRegistration(error.to_string()));
            }
        }

        let entry = Arc::new(ActorEntry {
            handle,
            name: name.clone(),
            implementation_tag,
            sender,
            cancel,
            stopped: AsyncMutex::new(Some(stop_rx)),
        });
        self.actors.insert(handle, entry);

        info!(%handle, name = name.as_deref(), "actor created");
        Ok(handle)
    }

    pub fn get_by_handle(&self, handle: Handle) -> Result<ActorRef, SystemError> {
        self.actors
            .get(&handle)
            .map(|e| e.as_ref())
            .ok_or(SystemError::ActorNotFound(handle))
    }

    /// Local lookup first; falls back to the cluster registry if configured,
    /// surfacing a synthetic remote reference.
    pub async fn get_by_name(&self, name: &str) -> Result<ActorRef, SystemError> {
        if let Some(handle) = self.names.get(name).map(|h| *h) {
            return self.get_by_handle(handle);
        }
        if let Some(registry) = &self.cluster_registry {
            let resolved = registry
                .try_resolve_by_name(name)
                .await
                .map_err(|e| SystemError::ClusterRegistration(e.to_string()))?;
            if let Some(location) = resolved {
                return Ok(ActorRef {
                    handle: location.handle,
                    name: Some(name.to_string()),
                    implementation_tag: format!("remote@{}", location.node_id),
                });
            }
        }
        Err(SystemError::NameNotFound(name.to_string()))
    }

    pub fn try_get_handle_by_name(&self, name: &str) -> Option<Handle> {
        self.names.get(name).map(|h| *h)
    }

    /// Returns the sole actor registered under `name`, creating it via
    /// `factory` if absent. A race between two callers resolves to a single
    /// winner; the loser observes `NameTaken` from [`Self::create`] and
    /// simply looks the winner's handle back up.
    pub async fn get_or_create_unique<A: Actor>(
        self: &Arc<Self>,
        name: &str,
        factory: impl FnOnce() -> A + Send + 'static,
    ) -> Result<ActorRef, SystemError> {
        if let Some(handle) = self.try_get_handle_by_name(name) {
            return self.get_by_handle(handle);
        }
        match self.create(factory, Some(name.to_string()), None).await {
            Ok(handle) => self.get_by_handle(handle),
            Err(SystemError::NameTaken(_)) => {
                let handle = self
                    .try_get_handle_by_name(name)
                    .ok_or_else(|| SystemError::NameNotFound(name.to_string()))?;
                self.get_by_handle(handle)
            }
            Err(other) => Err(other),
        }
    }

    /// Fire-and-forget delivery.
    pub async fn send(&self, to: Handle, payload: Payload, from: Option<Handle>) -> Result<(), SystemError> {
        let envelope = self.build_envelope(from.unwrap_or(Handle::NONE), to, CallType::Send, payload);
        self.transport.send(envelope, None, self.shutdown_token.clone()).await?;
        Ok(())
    }

    /// Request-response call, typed at the caller.
    pub async fn call<T: Any + Send>(
        &self,
        to: Handle,
        payload: Payload,
        timeout: Option<Duration>,
        from: Option<Handle>,
    ) -> Result<T, SystemError> {
        let envelope = self.build_envelope(from.unwrap_or(Handle::NONE), to, CallType::Call, payload);
        let (response_tx, response_rx) = oneshot::channel();
        self.transport.send(envelope, Some(response_tx), self.shutdown_token.clone()).await?;

        let outcome = match timeout {
            Some(duration) => match tokio::time::timeout(duration, response_rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => CallOutcome::Cancelled,
                Err(_) => return Err(SystemError::CallTimeout(to)),
            },
            None => response_rx.await.unwrap_or(CallOutcome::Cancelled),
        };

        match outcome {
            CallOutcome::Response(payload) => {
                let decoded = self.codec.decode(payload)?;
                decoded.downcast::<T>().map(|b| *b).map_err(|_| SystemError::TypeMismatch)
            }
            CallOutcome::Cancelled => Err(SystemError::CallCancelled(to)),
            CallOutcome::Fault(fault) => Err(SystemError::RemoteFault(fault.message)),
        }
    }

    /// Cancel an actor and release its bookkeeping. Returns true iff the
    /// actor was present and has fully stopped.
    pub async fn kill(&self, handle: Handle) -> bool {
        let Some((_, entry)) = self.actors.remove(&handle) else {
            return false;
        };
        if let Some(name) = &entry.name {
            self.names.remove(name);
            if let Some(registry) = &self.cluster_registry {
                if let Err(error) = registry.unregister_local_actor(name, handle).await {
                    warn!(%handle, %name, %error, "failed to release cluster name claim on kill");
                }
            }
        }
        self.metrics.unregister(handle);
        entry.cancel.cancel();

        let stop_rx = entry.stopped.lock().await.take();
        if let Some(stop_rx) = stop_rx {
            if tokio::time::timeout(self.config.shutdown_timeout, stop_rx).await.is_err() {
                warn!(%handle, "actor did not stop within shutdown_timeout");
            }
        }
        debug!(%handle, "actor killed");
        true
    }

    /// Point-in-time listing of every live actor.
    pub fn list_actors(&self) -> Vec<ActorRef> {
        self.actors.iter().map(|e| e.as_ref()).collect()
    }

    /// Stop every actor, releasing cluster name claims along the way.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.shutdown_token.cancel();
        let handles: Vec<Handle> = self.actors.iter().map(|e| *e.key()).collect();
        for handle in handles {
            self.kill(handle).await;
        }
        info!("actor system shutdown complete");
    }

    fn build_envelope(&self, from: Handle, to: Handle, call_type: CallType, payload: Payload) -> Envelope {
        Envelope::new(self.message_ids.allocate(), from, to, call_type, payload, None)
    }
}

#[async_trait]
impl Dispatcher for ActorSystem {
    async fn dispatch_send(&self, from: Handle, to: Handle, payload: Payload) -> Result<(), DispatchError> {
        let envelope = self.build_envelope(from, to, CallType::Send, payload);
        self.transport.send(envelope, None, self.shutdown_token.clone()).await.map_err(transport_to_dispatch_error)
    }

    async fn dispatch_call(
        &self,
        from: Handle,
        to: Handle,
        payload: Payload,
        timeout: Option<Duration>,
    ) -> Result<Payload, DispatchError> {
        let envelope = self.build_envelope(from, to, CallType::Call, payload);
        let (response_tx, response_rx) = oneshot::channel();
        self.transport
            .send(envelope, Some(response_tx), self.shutdown_token.clone())
            .await
            .map_err(transport_to_dispatch_error)?;

        let outcome = match timeout {
            Some(duration) => match tokio::time::timeout(duration, response_rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => CallOutcome::Cancelled,
                Err(_) => return Err(DispatchError::Timeout),
            },
            None => response_rx.await.unwrap_or(CallOutcome::Cancelled),
        };

        match outcome {
            CallOutcome::Response(payload) => Ok(payload),
            CallOutcome::Cancelled => Err(DispatchError::Cancelled),
            CallOutcome::Fault(fault) => Err(DispatchError::RemoteFault(fault.message)),
        }
    }
}

fn transport_to_dispatch_error(error: TransportError) -> DispatchError {
    match error {
        TransportError::UnknownTarget(h) => DispatchError::UnknownTarget(h),
        TransportError::Cancelled => DispatchError::Cancelled,
        TransportError::Connection(message) => DispatchError::RemoteFault(message),
    }
}

impl LocalDelivery for ActorSystem {
    fn deliver_local(
        &self,
        envelope: Envelope,
        response: Option<oneshot::Sender<CallOutcome>>,
    ) -> Result<(), TransportError> {
        let to = envelope.to;
        let Some(entry) = self.actors.get(&to) else {
            if let Some(response) = response {
                let _ = response.send(CallOutcome::Fault(RemoteCallFault::exception(
                    "UnknownTarget",
                    format!("no actor at handle {to}"),
                )));
            }
            return Err(TransportError::UnknownTarget(to));
        };
        let item = MailboxItem::new(envelope, response);
        entry.sender.enqueue(item).map_err(|_| TransportError::UnknownTarget(to))
    }
}
