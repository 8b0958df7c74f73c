//! The gateway: bridges external TCP/WebSocket clients into the actor mesh.
//!
//! [`Gateway`] owns two optional listeners (TCP, WebSocket) under one shared
//! cancellation token, plus the live session table. Each accepted connection
//! becomes a [`session::SessionActor`] created through the bound
//! [`crate::system::ActorSystem`]; [`wire`] frames the raw TCP byte stream,
//! while the WebSocket side leans on `axum`'s own message reassembly and
//! size limits. [`config`], [`context`], [`error`], [`router`], and [`types`]
//! are its configuration, session-facing API, error taxonomy, extension
//! point, and shared value types respectively.

// Layer 1: Standard library imports
use std::net::SocketAddr;
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Layer 3: Internal module imports
use crate::message::{Handle, Payload};
use crate::system::ActorSystem;
use crate::util::SessionId;

pub mod config;
pub mod context;
pub mod error;
pub mod router;
pub mod session;
pub mod types;
mod wire;

pub use config::{GatewayConfig, GatewayConfigBuilder, RouterFactory};
pub use context::SessionContext;
pub use error::GatewayError;
pub use router::SessionRouter;
pub use types::{ActivityTracker, ClientMessage, CloseReason, SessionMetadata};

use session::{SessionActor, SessionMessage};

struct SessionEntry {
    idle_task: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Accepts external clients and wraps each one in a session actor.
pub struct Gateway {
    config: GatewayConfig,
    system: Arc<ActorSystem>,
    sessions: DashMap<Handle, SessionEntry>,
    accept_cancel: CancellationToken,
    tcp_local_addr: Mutex<Option<SocketAddr>>,
    kill_tx: mpsc::UnboundedSender<Handle>,
    kill_rx: AsyncMutex<Option<mpsc::UnboundedReceiver<Handle>>>,
    tcp_listener_task: AsyncMutex<Option<JoinHandle<()>>>,
    ws_listener_task: AsyncMutex<Option<JoinHandle<()>>>,
    kill_loop_task: AsyncMutex<Option<JoinHandle<()>>>,
    self_weak: Weak<Self>,
}

impl Gateway {
    /// Construct a gateway bound to `system`, not yet listening.
    pub fn new(config: GatewayConfig, system: Arc<ActorSystem>) -> Result<Arc<Self>, GatewayError> {
        config.validate()?;
        let (kill_tx, kill_rx) = mpsc::unbounded_channel();
        Ok(Arc::new_cyclic(|weak| Self {
            config,
            system,
            sessions: DashMap::new(),
            accept_cancel: CancellationToken::new(),
            tcp_local_addr: Mutex::new(None),
            kill_tx,
            kill_rx: AsyncMutex::new(Some(kill_rx)),
            tcp_listener_task: AsyncMutex::new(None),
            ws_listener_task: AsyncMutex::new(None),
            kill_loop_task: AsyncMutex::new(None),
            self_weak: weak.clone(),
        }))
    }

    fn arc_self(&self) -> Arc<Self> {
        self.self_weak.upgrade().expect("Gateway outlives its own Arc")
    }

    /// Start whichever listeners are enabled, plus the background kill loop.
    pub async fn start(&self) -> Result<(), GatewayError> {
        if let Some(kill_rx) = self.kill_rx.lock().await.take() {
            let gateway = self.self_weak.clone();
            let task = tokio::spawn(Self::kill_loop(gateway, kill_rx));
            *self.kill_loop_task.lock().await = Some(task);
        }

        if self.config.tcp_enable {
            let addr = format!("{}:{}", self.config.tcp_address, self.config.tcp_port);
            let listener = TcpListener::bind(&addr).await?;
            *self.tcp_local_addr.lock() = Some(listener.local_addr()?);
            let gateway = self.self_weak.clone();
            let cancel = self.accept_cancel.clone();
            let task = tokio::spawn(Self::tcp_accept_loop(gateway, listener, cancel));
            *self.tcp_listener_task.lock().await = Some(task);
            info!(%addr, "gateway tcp listener started");
        }

        if self.config.ws_enable {
            let gateway = self.arc_self();
            let cancel = self.accept_cancel.clone();
            let addr = format!("{}:{}", self.config.ws_host, self.config.ws_port);
            let bound_addr = addr.clone();
            let listener = TcpListener::bind(&addr).await?;
            let task = tokio::spawn(async move {
                if let Err(error) = run_ws_listener(gateway, listener, cancel).await {
                    warn!(%error, "gateway websocket listener exited with error");
                }
            });
            *self.ws_listener_task.lock().await = Some(task);
            info!(addr = %bound_addr, path = %self.config.normalized_ws_path(), "gateway websocket listener started");
        }

        Ok(())
    }

    /// Close listeners, await their accept loops, enqueue a `ServerShutdown`
    /// close into every live session, and clear the session table.
    pub async fn stop(&self) {
        self.accept_cancel.cancel();
        if let Some(task) = self.tcp_listener_task.lock().await.take() {
            let _ = task.await;
        }
        if let Some(task) = self.ws_listener_task.lock().await.take() {
            let _ = task.await;
        }

        let handles: Vec<Handle> = self.sessions.iter().map(|entry| *entry.key()).collect();
        for handle in handles {
            let _ = self
                .system
                .send(handle, Payload::local(SessionMessage::Close(CloseReason::ServerShutdown)), None)
                .await;
        }
        for entry in self.sessions.iter() {
            entry.idle_task.abort();
        }
        self.sessions.clear();

        if let Some(task) = self.kill_loop_task.lock().await.take() {
            task.abort();
        }
        info!("gateway stopped");
    }

    /// The TCP listener's bound address, once [`Self::start`] has run. Useful
    /// in tests that bind an ephemeral port (`tcp_port: 0`).
    pub fn tcp_local_addr(&self) -> Option<SocketAddr> {
        *self.tcp_local_addr.lock()
    }

    /// Number of sessions currently tracked by the gateway.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Build the session actor, register its idle monitor, and hand back the
    /// channel its connection-handling task should drain for outbound writes.
    async fn spawn_session(
        self: &Arc<Self>,
        protocol: &'static str,
        remote_addr: Option<SocketAddr>,
    ) -> Result<(Handle, mpsc::UnboundedReceiver<ClientMessage>, CancellationToken), GatewayError> {
        let metadata = SessionMetadata { session_id: SessionId::new(), protocol, remote_addr, connected_at: Utc::now() };
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let activity = Arc::new(ActivityTracker::new());
        let router_factory = self
            .config
            .router_factory
            .as_ref()
            .expect("router_factory is required and checked by GatewayConfig::validate");
        let router = router_factory();
        let kill_tx = self.kill_tx.clone();
        let actor_activity = Arc::clone(&activity);

        let handle = self
            .system
            .create(move || SessionActor::new(router, metadata, write_tx, kill_tx, actor_activity), None, None)
            .await?;

        let cancel = self.accept_cancel.child_token();
        let idle_cancel = cancel.clone();
        let idle_timeout = self.config.idle_timeout;
        let idle_system = Arc::clone(&self.system);
        let idle_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = idle_cancel.cancelled() => break,
                    _ = tokio::time::sleep(idle_timeout) => {
                        if activity.age() >= idle_timeout {
                            let _ = idle_system
                                .send(handle, Payload::local(SessionMessage::Close(CloseReason::HeartbeatTimeout)), None)
                                .await;
                            break;
                        }
                    }
                }
            }
        });

        self.sessions.insert(handle, SessionEntry { idle_task, cancel: cancel.clone() });
        Ok((handle, write_rx, cancel))
    }

    async fn tcp_accept_loop(gateway: Weak<Self>, listener: TcpListener, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => {
                    let Ok((stream, peer_addr)) = accepted else { continue };
                    let Some(gateway) = gateway.upgrade() else { break };
                    tokio::spawn(async move {
                        gateway.handle_tcp_connection(stream, peer_addr).await;
                    });
                }
            }
        }
    }

    async fn handle_tcp_connection(self: Arc<Self>, stream: TcpStream, peer_addr: SocketAddr) {
        let (handle, write_rx, cancel) = match self.spawn_session("tcp", Some(peer_addr)).await {
            Ok(triple) => triple,
            Err(error) => {
                warn!(%peer_addr, %error, "failed to create tcp session actor");
                return;
            }
        };
        let (read_half, write_half) = stream.into_split();
        let system = Arc::clone(&self.system);
        let max = self.config.max_message_bytes;
        tokio::spawn(Self::tcp_reader_loop(system, handle, read_half, max, cancel.clone()));
        tokio::spawn(Self::tcp_writer_loop(write_half, write_rx, cancel));
    }

    async fn tcp_reader_loop(
        system: Arc<ActorSystem>,
        handle: Handle,
        mut read_half: OwnedReadHalf,
        max_message_bytes: usize,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                frame = wire::read_frame(&mut read_half, max_message_bytes) => {
                    match frame {
                        Ok(payload) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Inbound(ClientMessage::Binary(payload.into()))), None)
                                .await;
                        }
                        Err(GatewayError::Io(_)) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Close(CloseReason::ClientDisconnected)), None)
                                .await;
                            break;
                        }
                        Err(error) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Close(CloseReason::ProtocolViolation(error.to_string()))), None)
                                .await;
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn tcp_writer_loop(
        mut write_half: OwnedWriteHalf,
        mut write_rx: mpsc::UnboundedReceiver<ClientMessage>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = write_rx.recv() => {
                    let Some(message) = received else { break };
                    let bytes: &[u8] = match &message {
                        ClientMessage::Binary(bytes) => bytes,
                        ClientMessage::Text(text) => text.as_bytes(),
                    };
                    if wire::write_frame(&mut write_half, bytes).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    async fn handle_ws_connection(self: Arc<Self>, socket: WebSocket, remote_addr: SocketAddr) {
        let (handle, write_rx, cancel) = match self.spawn_session("ws", Some(remote_addr)).await {
            Ok(triple) => triple,
            Err(error) => {
                warn!(%remote_addr, %error, "failed to create websocket session actor");
                return;
            }
        };
        let (sink, stream) = socket.split();
        let system = Arc::clone(&self.system);
        tokio::spawn(Self::ws_reader_loop(system, handle, stream, cancel.clone()));
        tokio::spawn(Self::ws_writer_loop(sink, write_rx, cancel));
    }

    async fn ws_reader_loop(
        system: Arc<ActorSystem>,
        handle: Handle,
        mut stream: futures::stream::SplitStream<WebSocket>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = stream.next() => {
                    match next {
                        Some(Ok(WsMessage::Binary(bytes))) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Inbound(ClientMessage::Binary(bytes))), None)
                                .await;
                        }
                        Some(Ok(WsMessage::Text(text))) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Inbound(ClientMessage::Text(text.to_string()))), None)
                                .await;
                        }
                        Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => continue,
                        Some(Ok(WsMessage::Close(_))) | None => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Close(CloseReason::ClientDisconnected)), None)
                                .await;
                            break;
                        }
                        Some(Err(error)) => {
                            let _ = system
                                .send(handle, Payload::local(SessionMessage::Close(CloseReason::ProtocolViolation(error.to_string()))), None)
                                .await;
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn ws_writer_loop(
        mut sink: futures::stream::SplitSink<WebSocket, WsMessage>,
        mut write_rx: mpsc::UnboundedReceiver<ClientMessage>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = write_rx.recv() => {
                    let Some(message) = received else { break };
                    let frame = match message {
                        ClientMessage::Binary(bytes) => WsMessage::Binary(bytes),
                        ClientMessage::Text(text) => WsMessage::Text(text.into()),
                    };
                    if sink.send(frame).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    async fn kill_loop(gateway: Weak<Self>, mut kill_rx: mpsc::UnboundedReceiver<Handle>) {
        while let Some(handle) = kill_rx.recv().await {
            let Some(gateway) = gateway.upgrade() else { break };
            gateway.system.kill(handle).await;
            if let Some((_, entry)) = gateway.sessions.remove(&handle) {
                entry.cancel.cancel();
                entry.idle_task.abort();
            }
        }
    }
}

async fn run_ws_listener(gateway: Arc<Gateway>, listener: TcpListener, cancel: CancellationToken) -> Result<(), GatewayError> {
    let path = gateway.config.normalized_ws_path();
    let router = Router::new().route(&path, get(ws_upgrade_handler)).with_state(gateway);
    let make_service = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|error| GatewayError::WebSocket(error.to_string()))
}

async fn ws_upgrade_handler(
    State(gateway): State<Arc<Gateway>>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let max = gateway.config.max_message_bytes;
    ws.max_message_size(max).max_frame_size(max).on_upgrade(move |socket| async move {
        gateway.handle_ws_connection(socket, remote_addr).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorContext;
    use crate::system::{ActorSystemBuilder, SystemConfig};
    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::Duration;

    struct EchoRouter {
        closed: Arc<SyncMutex<Option<CloseReason>>>,
    }

    #[async_trait]
    impl SessionRouter for EchoRouter {
        async fn on_message(&self, _actor_ctx: &ActorContext, session: &SessionContext, message: ClientMessage) {
            if let ClientMessage::Binary(bytes) = message {
                let text = String::from_utf8_lossy(&bytes).to_uppercase();
                let _ = session.send(text.into_bytes());
            }
        }

        async fn on_closed(&self, _actor_ctx: &ActorContext, _session: &SessionContext, reason: CloseReason) {
            *self.closed.lock() = Some(reason);
        }
    }

    async fn write_frame_client(stream: &mut TcpStream, payload: &[u8]) {
        let len = payload.len() as i32;
        stream.write_all(&len.to_be_bytes()).await.unwrap();
        stream.write_all(payload).await.unwrap();
    }

    async fn read_frame_client(stream: &mut TcpStream) -> Vec<u8> {
        let mut len_bytes = [0u8; 4];
        stream.read_exact(&mut len_bytes).await.unwrap();
        let len = i32::from_be_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await.unwrap();
        payload
    }

    #[tokio::test]
    async fn test_tcp_echo_round_trip_and_disconnect_notifies_router() {
        let system = ActorSystemBuilder::new(SystemConfig::default()).build();
        let closed = Arc::new(SyncMutex::new(None));
        let router_closed = Arc::clone(&closed);
        let config = GatewayConfig::builder()
            .with_tcp(true, "127.0.0.1", 0)
            .with_ws(false, "127.0.0.1", 0)
            .with_router_factory(move || Arc::new(EchoRouter { closed: Arc::clone(&router_closed) }) as Arc<dyn SessionRouter>)
            .build()
            .unwrap();
        let gateway = Gateway::new(config, system).unwrap();
        gateway.start().await.unwrap();
        let addr = gateway.tcp_local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        write_frame_client(&mut client, b"hello").await;
        let reply = read_frame_client(&mut client).await;
        assert_eq!(reply, b"HELLO");

        drop(client);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*closed.lock(), Some(CloseReason::ClientDisconnected));

        gateway.stop().await;
        assert_eq!(gateway.session_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_notifies_live_sessions_with_server_shutdown() {
        let system = ActorSystemBuilder::new(SystemConfig::default()).build();
        let closed = Arc::new(SyncMutex::new(None));
        let router_closed = Arc::clone(&closed);
        let config = GatewayConfig::builder()
            .with_tcp(true, "127.0.0.1", 0)
            .with_ws(false, "127.0.0.1", 0)
            .with_router_factory(move || Arc::new(EchoRouter { closed: Arc::clone(&router_closed) }) as Arc<dyn SessionRouter>)
            .build()
            .unwrap();
        let gateway = Gateway::new(config, system).unwrap();
        gateway.start().await.unwrap();
        let addr = gateway.tcp_local_addr().unwrap();

        let client = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gateway.session_count(), 1);

        gateway.stop().await;
        assert_eq!(*closed.lock(), Some(CloseReason::ServerShutdown));
        assert_eq!(gateway.session_count(), 0);
        drop(client);
    }

    #[tokio::test]
    async fn test_protocol_violation_on_negative_length_closes_session() {
        let system = ActorSystemBuilder::new(SystemConfig::default()).build();
        let closed = Arc::new(SyncMutex::new(None));
        let router_closed = Arc::clone(&closed);
        let config = GatewayConfig::builder()
            .with_tcp(true, "127.0.0.1", 0)
            .with_ws(false, "127.0.0.1", 0)
            .with_router_factory(move || Arc::new(EchoRouter { closed: Arc::clone(&router_closed) }) as Arc<dyn SessionRouter>)
            .build()
            .unwrap();
        let gateway = Gateway::new(config, system).unwrap();
        gateway.start().await.unwrap();
        let addr = gateway.tcp_local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(&(-1i32).to_be_bytes()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        match closed.lock().clone() {
            Some(CloseReason::ProtocolViolation(detail)) => assert!(detail.contains("negative")),
            other => panic!("unexpected close reason: {other:?}"),
        }

        gateway.stop().await;
    }
}
