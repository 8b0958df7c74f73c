//! Point-to-point duplex links between cluster nodes, with request
//! correlation and liveness.
//!
//! Ownership graph: [`ClusterTransport`]
//! is the sole owner of the peer table; each [`PeerConnection`] is the sole
//! owner of its socket halves and the two tasks driving them (read loop,
//! heartbeat loop). Tearing a peer down means cancelling that connection's
//! own token, which both of its tasks observe independently — neither task
//! holds a strong reference back to the transport, only a [`Weak`] one, so
//! the ownership graph has no cycle.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use super::config::ClusterTransportConfig;
use super::error::ClusterError;
use super::protocol::{self, DecodedFrame, REMOTE_CALL_FAULT_TAG};
use crate::mailbox::CallOutcome;
use crate::message::{Envelope, Handle, Payload, RemoteCallFault};
use crate::registry::ClusterRegistry;
use crate::transport::{LocalBound, LocalDelivery, Transport, TransportError};

/// One outbound `Call`'s correlation state, keyed by message-id, while its
/// reply is still in flight over the wire.
struct PendingCall {
    response: oneshot::Sender<CallOutcome>,
}

/// A live link to one peer node: socket halves, the two tasks serving them,
/// and the per-connection write mutex preserving FIFO ordering on the wire.
struct PeerConnection {
    node_id: String,
    write: AsyncMutex<OwnedWriteHalf>,
    cancel: CancellationToken,
    read_task: AsyncMutex<Option<JoinHandle<()>>>,
    heartbeat_task: AsyncMutex<Option<JoinHandle<()>>>,
}

impl PeerConnection {
    async fn write_frame_envelope(&self, wire: &protocol::WireEnvelope) -> Result<(), ClusterError> {
        let mut guard = self.write.lock().await;
        protocol::write_envelope_frame(&mut *guard, wire).await
    }

    async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.read_task.lock().await.take() {
            let _ = task.await;
        }
        if let Some(task) = self.heartbeat_task.lock().await.take() {
            task.abort();
        }
    }
}

/// The TCP cluster transport: one per node, bound to a [`ClusterRegistry`]
/// for node/name resolution.
pub struct ClusterTransport {
    node_id: String,
    config: ClusterTransportConfig,
    registry: Arc<dyn ClusterRegistry>,
    local: RwLock<Option<Arc<dyn LocalDelivery>>>,
    peers: DashMap<String, Arc<PeerConnection>>,
    connect_locks: DashMap<String, Arc<AsyncMutex<()>>>,
    pending: DashMap<u64, PendingCall>,
    cancel: CancellationToken,
    listener_task: AsyncMutex<Option<JoinHandle<()>>>,
    /// Self-reference used to hand an owning [`Arc`] to spawned tasks from
    /// methods that only receive `&self` (notably [`Transport::send`], whose
    /// signature is fixed by the trait). Set once at construction via
    /// `Arc::new_cyclic`; always upgradable for the transport's own lifetime.
    self_weak: Weak<Self>,
}

impl ClusterTransport {
    /// Construct a transport bound to `registry`, not yet listening.
    pub fn new(node_id: impl Into<String>, config: ClusterTransportConfig, registry: Arc<dyn ClusterRegistry>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            node_id: node_id.into(),
            config,
            registry,
            local: RwLock::new(None),
            peers: DashMap::new(),
            connect_locks: DashMap::new(),
            pending: DashMap::new(),
            cancel: CancellationToken::new(),
            listener_task: AsyncMutex::new(None),
            self_weak: weak.clone(),
        })
    }

    /// This transport's own `Arc`, for handing to spawned tasks.
    fn arc_self(&self) -> Arc<Self> {
        self.self_weak.upgrade().expect("ClusterTransport outlives its own Arc")
    }

    /// Bind a TCP listener at `addr` and spawn its accept loop.
    pub async fn listen(&self, addr: &str) -> Result<(), ClusterError> {
        let listener = TcpListener::bind(addr).await?;
        let transport = self.self_weak.clone();
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, peer_addr)) = accepted else { continue };
                        let Some(transport) = transport.upgrade() else { break };
                        tokio::spawn(async move {
                            if let Err(error) = transport.accept_peer(stream).await {
                                warn!(%peer_addr, %error, "cluster peer handshake failed");
                            }
                        });
                    }
                }
            }
        });
        *self.listener_task.lock().await = Some(task);
        Ok(())
    }

    /// Complete the inbound handshake for a freshly accepted connection,
    /// then register it and start its read/heartbeat loops.
    async fn accept_peer(&self, stream: TcpStream) -> Result<(), ClusterError> {
        let (mut read_half, mut write_half) = stream.into_split();
        // the inbound side replies first after reading
        let peer_node_id = protocol::read_handshake(&mut read_half, self.config.max_frame_bytes).await?;
        protocol::write_handshake(&mut write_half, &self.node_id).await?;
        self.register_peer(peer_node_id, read_half, write_half).await;
        Ok(())
    }

    /// Double-checked-lock connect: reuse an existing link, or dial and
    /// handshake a new one under a per-peer async mutex.
    async fn get_or_connect(&self, node_id: &str) -> Result<Arc<PeerConnection>, ClusterError> {
        if let Some(existing) = self.peers.get(node_id) {
            return Ok(Arc::clone(existing.value()));
        }
        let lock = self
            .connect_locks
            .entry(node_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;
        if let Some(existing) = self.peers.get(node_id) {
            return Ok(Arc::clone(existing.value()));
        }

        let descriptor = self
            .registry
            .try_get_node(node_id)
            .await?
            .ok_or_else(|| ClusterError::NodeUnreachable(node_id.to_string()))?;

        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(descriptor.endpoint.as_str()))
            .await
            .map_err(|_| ClusterError::ConnectTimeout(self.config.connect_timeout))??;

        let (mut read_half, mut write_half) = stream.into_split();
        // the outbound side sends first
        protocol::write_handshake(&mut write_half, &self.node_id).await?;
        let confirmed_node_id = protocol::read_handshake(&mut read_half, self.config.max_frame_bytes).await?;
        Ok(self.register_peer(confirmed_node_id, read_half, write_half).await)
    }

    /// Install a handshaked connection into the peer table and spawn its loops.
    async fn register_peer(
        &self,
        peer_node_id: String,
        read_half: OwnedReadHalf,
        write_half: OwnedWriteHalf,
    ) -> Arc<PeerConnection> {
        let cancel = self.cancel.child_token();
        let peer = Arc::new(PeerConnection {
            node_id: peer_node_id.clone(),
            write: AsyncMutex::new(write_half),
            cancel: cancel.clone(),
            read_task: AsyncMutex::new(None),
            heartbeat_task: AsyncMutex::new(None),
        });
        self.peers.insert(peer_node_id.clone(), Arc::clone(&peer));

        let weak_self = self.self_weak.clone();
        let max_frame_bytes = self.config.max_frame_bytes;
        let read_cancel = cancel.clone();
        let read_node_id = peer_node_id.clone();
        let read_task = tokio::spawn(Self::read_loop(weak_self, read_half, read_node_id, max_frame_bytes, read_cancel));
        *peer.read_task.lock().await = Some(read_task);

        if !self.config.heartbeat_interval.is_zero() {
            let heartbeat_peer = Arc::clone(&peer);
            let interval = self.config.heartbeat_interval;
            let heartbeat_cancel = cancel;
            let heartbeat_task = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    tokio::select! {
                        biased;
                        _ = heartbeat_cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            let mut guard = heartbeat_peer.write.lock().await;
                            if protocol::write_heartbeat(&mut *guard).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
            *peer.heartbeat_task.lock().await = Some(heartbeat_task);
        }

        info!(node_id = %peer_node_id, "cluster peer connected");
        peer
    }

    /// One peer's read loop: decode frames until EOF/error, then tear the
    /// connection down. Pending calls routed through this peer are *not*
    /// cancelled here —
    /// they resolve via their own timeout or cancellation.
    async fn read_loop(
        transport: Weak<Self>,
        mut read_half: OwnedReadHalf,
        peer_node_id: String,
        max_frame_bytes: u32,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                frame = protocol::read_decoded_frame(&mut read_half, max_frame_bytes) => {
                    match frame {
                        Ok(DecodedFrame::Heartbeat) => continue,
                        Ok(DecodedFrame::Handshake(_)) => continue,
                        Ok(DecodedFrame::Envelope(wire)) => {
                            let Some(transport) = transport.upgrade() else { break };
                            transport.handle_inbound(wire, &peer_node_id).await;
                        }
                        Err(error) => {
                            debug!(node_id = %peer_node_id, %error, "cluster peer read loop closing");
                            break;
                        }
                    }
                }
            }
        }
        if let Some(transport) = transport.upgrade() {
            transport.peers.remove(&peer_node_id);
            transport.connect_locks.remove(&peer_node_id);
            info!(node_id = %peer_node_id, "cluster peer disconnected");
        }
    }

    /// Dispatch one decoded inbound envelope: either complete a pending
    /// call, or deliver locally and (for `Call`) reply over the same
    /// connection.
    async fn handle_inbound(&self, wire: protocol::WireEnvelope, peer_node_id: &str) {
        let message_id = wire.message_id;
        if let Some((_, pending)) = self.pending.remove(&message_id) {
            let outcome = if wire.payload_type_tag == REMOTE_CALL_FAULT_TAG {
                match serde_json::from_slice::<RemoteCallFault>(&wire.payload_bytes) {
                    Ok(fault) if fault.is_cancellation => CallOutcome::Cancelled,
                    Ok(fault) => CallOutcome::Fault(fault),
                    Err(error) => CallOutcome::Fault(RemoteCallFault::exception("DecodeError", error.to_string())),
                }
            } else {
                CallOutcome::Response(Payload::Encoded { type_tag: wire.payload_type_tag, bytes: wire.payload_bytes.into() })
            };
            let _ = pending.response.send(outcome);
            return;
        }

        let envelope = match protocol::wire_to_envelope(wire) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "dropping malformed inbound cluster envelope");
                return;
            }
        };

        let Some(local) = self.local.read().clone() else {
            warn!("cluster transport has no local-delivery target bound");
            return;
        };

        match envelope.call_type {
            crate::message::CallType::Send => {
                let _ = local.deliver_local(envelope, None);
            }
            crate::message::CallType::Call => {
                let message_id = envelope.message_id.get();
                let (response_tx, response_rx) = oneshot::channel();
                if let Err(error) = local.deliver_local(envelope, Some(response_tx)) {
                    self.reply_fault(peer_node_id, message_id, RemoteCallFault::exception("UnknownTarget", error.to_string()))
                        .await;
                    return;
                }
                let transport = self.arc_self();
                let peer_node_id = peer_node_id.to_string();
                tokio::spawn(async move {
                    match response_rx.await {
                        Ok(CallOutcome::Response(payload)) => transport.reply_success(&peer_node_id, message_id, payload).await,
                        Ok(CallOutcome::Cancelled) => {
                            transport.reply_fault(&peer_node_id, message_id, RemoteCallFault::cancellation("handler cancelled")).await
                        }
                        Ok(CallOutcome::Fault(fault)) => transport.reply_fault(&peer_node_id, message_id, fault).await,
                        Err(_) => {
                            transport
                                .reply_fault(&peer_node_id, message_id, RemoteCallFault::exception("Dropped", "response promise dropped"))
                                .await
                        }
                    }
                });
            }
        }
    }

    async fn reply_success(&self, peer_node_id: &str, message_id: u64, payload: Payload) {
        let Payload::Encoded { type_tag, bytes } = payload else {
            self.reply_fault(peer_node_id, message_id, RemoteCallFault::exception("PayloadNotEncoded", "handler returned a local payload across the wire")).await;
            return;
        };
        self.write_reply(peer_node_id, message_id, type_tag, bytes.to_vec()).await;
    }

    async fn reply_fault(&self, peer_node_id: &str, message_id: u64, fault: RemoteCallFault) {
        let bytes = serde_json::to_vec(&fault).unwrap_or_default();
        self.write_reply(peer_node_id, message_id, REMOTE_CALL_FAULT_TAG.to_string(), bytes).await;
    }

    async fn write_reply(&self, peer_node_id: &str, message_id: u64, payload_type_tag: String, payload_bytes: Vec<u8>) {
        let Some(peer) = self.peers.get(peer_node_id).map(|p| Arc::clone(p.value())) else {
            warn!(node_id = %peer_node_id, "cannot reply: peer connection gone");
            return;
        };
        let wire = protocol::WireEnvelope {
            message_id,
            from: Handle::NONE.get(),
            to: Handle::NONE.get(),
            call_type: crate::message::CallType::Call,
            trace_id: String::new(),
            timestamp: chrono::Utc::now(),
            ttl: None,
            version: crate::message::PROTOCOL_VERSION,
            payload_type_tag,
            payload_bytes,
        };
        if let Err(error) = peer.write_frame_envelope(&wire).await {
            warn!(node_id = %peer_node_id, %error, "failed to write cluster reply frame");
        }
    }

    fn register_pending(&self, message_id: u64, response: oneshot::Sender<CallOutcome>) {
        self.pending.insert(message_id, PendingCall { response });
    }

    /// Cancel every outstanding pending call, close every connection, and
    /// stop the listener.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.listener_task.lock().await.take() {
            let _ = task.await;
        }
        let pending_ids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        for message_id in pending_ids {
            if let Some((_, pending)) = self.pending.remove(&message_id) {
                let _ = pending.response.send(CallOutcome::Cancelled);
            }
        }
        let peers: Vec<Arc<PeerConnection>> = self.peers.iter().map(|e| Arc::clone(e.value())).collect();
        for peer in peers {
            peer.shutdown().await;
        }
        self.peers.clear();
        info!(node_id = %self.node_id, "cluster transport shut down");
    }

    /// Number of currently connected peers, for tests and diagnostics.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}

#[async_trait]
impl Transport for ClusterTransport {
    /// Local-by-registry-check first, else resolve
    /// the target's node and ship a framed envelope over its connection.
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
        let to = envelope.to;
        let location = self.registry.try_resolve_by_handle(to).await.map_err(ClusterError::from)?;

        let is_local = match &location {
            Some(loc) => loc.node_id == self.node_id,
            None => true,
        };

        if is_local {
            if let Some(local) = self.local.read().clone() {
                match local.deliver_local(envelope, response) {
                    Ok(()) => return Ok(()),
                    Err(error) if location.is_some() => return Err(error),
                    Err(_) if location.is_none() => {
                        // Unregistered handle and not locally present either: no route.
                        return Err(TransportError::UnknownTarget(to));
                    }
                    Err(error) => return Err(error),
                }
            }
            return Err(TransportError::UnknownTarget(to));
        }

        let location = location.expect("non-local branch always has a location");
        let message_id = envelope.message_id.get();
        if let Some(tx) = response {
            self.register_pending(message_id, tx);
        }

        let wire = match protocol::envelope_to_wire(&envelope) {
            Ok(wire) => wire,
            Err(error) => {
                self.fail_pending(message_id, &error.to_string());
                return Err(error.into());
            }
        };

        let peer = match self.get_or_connect(&location.node_id).await {
            Ok(peer) => peer,
            Err(error) => {
                self.fail_pending(message_id, &error.to_string());
                return Err(error.into());
            }
        };

        if let Err(error) = peer.write_frame_envelope(&wire).await {
            self.fail_pending(message_id, &error.to_string());
            return Err(error.into());
        }
        Ok(())
    }
}

impl ClusterTransport {
    fn fail_pending(&self, message_id: u64, message: &str) {
        if let Some((_, pending)) = self.pending.remove(&message_id) {
            let _ = pending
                .response
                .send(CallOutcome::Fault(RemoteCallFault::exception("TransportError", message.to_string())));
        }
    }

    /// Eagerly establish (or reuse) the connection to `node_id`. Optional —
    /// [`Transport::send`] dials lazily via [`Self::get_or_connect`] — but
    /// useful for cluster deployments that want connect failures surfaced
    /// at startup rather than on the first outbound message.
    pub async fn connect(&self, node_id: &str) -> Result<(), ClusterError> {
        self.get_or_connect(node_id).await?;
        Ok(())
    }
}

impl LocalBound for ClusterTransport {
    fn bind_local(&self, local: Arc<dyn LocalDelivery>) {
        *self.local.write() = Some(local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CallType, MessageId};
    use crate::registry::StaticRegistry;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    struct CountingLocal {
        count: Arc<AtomicUsize>,
    }

    impl LocalDelivery for CountingLocal {
        fn deliver_local(&self, _envelope: Envelope, _response: Option<oneshot::Sender<CallOutcome>>) -> Result<(), TransportError> {
            self.count.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(())
        }
    }

    fn envelope(to: Handle) -> Envelope {
        Envelope::new(MessageId::from_raw(1), Handle::NONE, to, CallType::Send, Payload::local(()), None)
    }

    fn encoded_envelope(to: Handle) -> Envelope {
        Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            to,
            CallType::Send,
            Payload::Encoded { type_tag: "ping".to_string(), bytes: bytes::Bytes::from_static(b"{}") },
            None,
        )
    }

    #[tokio::test]
    async fn test_send_delivers_locally_when_unregistered() {
        let registry = Arc::new(StaticRegistry::new("node-a", HashMap::new(), HashMap::new()));
        let transport = ClusterTransport::new("node-a", ClusterTransportConfig::default(), registry);
        let count = Arc::new(AtomicUsize::new(0));
        transport.bind_local(Arc::new(CountingLocal { count: Arc::clone(&count) }));

        transport.send(envelope(Handle::new(1).unwrap()), None, CancellationToken::new()).await.unwrap();
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_fails_for_unregistered_handle_with_no_local_binding() {
        let registry = Arc::new(StaticRegistry::new("node-a", HashMap::new(), HashMap::new()));
        let transport = ClusterTransport::new("node-a", ClusterTransportConfig::default(), registry);
        let result = transport.send(envelope(Handle::new(999).unwrap()), None, CancellationToken::new()).await;
        assert!(matches!(result, Err(TransportError::UnknownTarget(_))));
    }

    #[tokio::test]
    async fn test_peer_count_starts_at_zero() {
        let registry = Arc::new(StaticRegistry::new("node-a", HashMap::new(), HashMap::new()));
        let transport = ClusterTransport::new("node-a", ClusterTransportConfig::default(), registry);
        assert_eq!(transport.peer_count(), 0);
    }

    /// A registry that always resolves the one handle it's told about to a
    /// fixed remote node, regardless of which process asks. `StaticRegistry`
    /// can't express this (its `by_handle` table only ever stamps its own
    /// `local_node_id`), so node-b's view of "handle 2001 lives on node-a"
    /// needs its own minimal stand-in here.
    struct RemoteOnlyRegistry {
        local_node_id: String,
        remote_node: crate::registry::NodeDescriptor,
        remote_handle: Handle,
    }

    #[async_trait]
    impl ClusterRegistry for RemoteOnlyRegistry {
        fn local_node_id(&self) -> &str {
            &self.local_node_id
        }

        async fn try_resolve_by_name(&self, _name: &str) -> Result<Option<crate::registry::ActorLocation>, crate::registry::RegistryError> {
            Ok(None)
        }

        async fn try_resolve_by_handle(&self, handle: Handle) -> Result<Option<crate::registry::ActorLocation>, crate::registry::RegistryError> {
            if handle == self.remote_handle {
                Ok(Some(crate::registry::ActorLocation::new(self.remote_node.node_id.clone(), handle)))
            } else {
                Ok(None)
            }
        }

        async fn try_get_node(&self, node_id: &str) -> Result<Option<crate::registry::NodeDescriptor>, crate::registry::RegistryError> {
            if node_id == self.remote_node.node_id {
                Ok(Some(self.remote_node.clone()))
            } else {
                Ok(None)
            }
        }

        async fn register_local_actor(&self, _name: &str, _handle: Handle) -> Result<(), crate::registry::RegistryError> {
            Ok(())
        }

        async fn unregister_local_actor(&self, _name: &str, _handle: Handle) -> Result<(), crate::registry::RegistryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_tcp_round_trip_delivers_send_to_remote_node() {
        let remote_handle = Handle::new(2001).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let registry_a = Arc::new(StaticRegistry::new("node-a", HashMap::new(), HashMap::new()));
        let transport_a = ClusterTransport::new("node-a", ClusterTransportConfig::default(), registry_a as Arc<dyn ClusterRegistry>);
        let count = Arc::new(AtomicUsize::new(0));
        transport_a.bind_local(Arc::new(CountingLocal { count: Arc::clone(&count) }));
        transport_a.listen(&addr).await.unwrap();

        let registry_b = Arc::new(RemoteOnlyRegistry {
            local_node_id: "node-b".to_string(),
            remote_node: crate::registry::NodeDescriptor::new("node-a", addr.clone()),
            remote_handle,
        });
        let transport_b = ClusterTransport::new("node-b", ClusterTransportConfig::default(), registry_b as Arc<dyn ClusterRegistry>);
        transport_b.bind_local(Arc::new(CountingLocal { count: Arc::new(AtomicUsize::new(0)) }));

        transport_b.send(encoded_envelope(remote_handle), None, CancellationToken::new()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(transport_a.peer_count(), 1);
        assert_eq!(transport_b.peer_count(), 1);

        transport_a.shutdown().await;
        transport_b.shutdown().await;
    }

    #[derive(Debug, thiserror::Error)]
    #[error("echo actor error")]
    struct EchoError;

    /// Decodes an incoming `Call`'s text payload and replies with it
    /// prefixed `echo:`, re-encoded under the same tag — the shape every
    /// remote typed `Call` needs from a handler.
    struct EchoActor {
        codec: Arc<crate::message::Codec>,
    }

    #[async_trait]
    impl crate::actor::Actor for EchoActor {
        type Error = EchoError;

        async fn handle(
            &mut self,
            envelope: Envelope,
            _ctx: &crate::actor::ActorContext,
        ) -> Result<Option<Payload>, Self::Error> {
            match envelope.call_type {
                CallType::Call => {
                    let decoded = self.codec.decode(envelope.payload).map_err(|_| EchoError)?;
                    let text = decoded.downcast::<String>().map_err(|_| EchoError)?;
                    let reply = self.codec.encode("text", &format!("echo:{text}")).map_err(|_| EchoError)?;
                    Ok(Some(reply))
                }
                CallType::Send => Ok(None),
            }
        }
    }

    /// End-to-end spec §8 scenario 4: a typed `Call` from node-b reaches
    /// node-a's `echo` actor over TCP and the decoded reply matches
    /// `"echo:pong"` through the public [`crate::system::ActorSystem::call`] API.
    #[tokio::test]
    async fn test_cluster_typed_call_round_trip_decodes_response() {
        use crate::message::Codec;
        use crate::system::{ActorSystemBuilder, SystemConfig};

        let remote_handle = Handle::new(1001).unwrap();
        let codec = Arc::new(Codec::new());
        codec.register::<String>("text");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let registry_a = Arc::new(StaticRegistry::new("node-a", HashMap::new(), HashMap::new()));
        let transport_a = ClusterTransport::new("node-a", ClusterTransportConfig::default(), registry_a as Arc<dyn ClusterRegistry>);
        let system_a = ActorSystemBuilder::new(SystemConfig::default())
            .with_codec(Arc::clone(&codec))
            .build_with_transport(Arc::clone(&transport_a));
        {
            let actor_codec = Arc::clone(&codec);
            system_a
                .create(move || EchoActor { codec: actor_codec }, Some("echo".to_string()), Some(remote_handle))
                .await
                .unwrap();
        }
        transport_a.listen(&addr).await.unwrap();

        let registry_b = Arc::new(RemoteOnlyRegistry {
            local_node_id: "node-b".to_string(),
            remote_node: crate::registry::NodeDescriptor::new("node-a", addr.clone()),
            remote_handle,
        });
        let transport_b = ClusterTransport::new("node-b", ClusterTransportConfig::default(), registry_b as Arc<dyn ClusterRegistry>);
        let system_b = ActorSystemBuilder::new(SystemConfig::default())
            .with_codec(Arc::clone(&codec))
            .build_with_transport(Arc::clone(&transport_b));

        let request = codec.encode("text", &"ping".to_string()).unwrap();
        let reply: String = system_b
            .call(remote_handle, request, Some(Duration::from_secs(2)), None)
            .await
            .unwrap();
        assert_eq!(reply, "echo:pong");

        transport_a.shutdown().await;
        transport_b.shutdown().await;
    }
}
