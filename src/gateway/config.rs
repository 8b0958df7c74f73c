//! Gateway configuration.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::error::GatewayError;
use super::router::SessionRouter;

/// Default TCP listener address.
pub const DEFAULT_TCP_ADDRESS: &str = "0.0.0.0";
/// Default TCP listener port.
pub const DEFAULT_TCP_PORT: u16 = 7420;
/// Default TCP listen backlog. Recorded for API completeness; the `tokio`
/// listener this gateway binds through does not expose a backlog knob, so
/// the value is not currently applied to the underlying socket.
pub const DEFAULT_TCP_BACKLOG: u32 = 1024;
/// Default WebSocket listener host.
pub const DEFAULT_WS_HOST: &str = "0.0.0.0";
/// Default WebSocket listener port.
pub const DEFAULT_WS_PORT: u16 = 7421;
/// Default WebSocket upgrade path.
pub const DEFAULT_WS_PATH: &str = "/";
/// Default maximum reassembled message size (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;
/// Default per-connection receive buffer size.
pub const DEFAULT_RECEIVE_BUFFER_BYTES: usize = 8192;
/// Default idle-timeout before a session is closed as `HeartbeatTimeout`.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Constructs one [`SessionRouter`] per accepted connection.
///
/// A factory, not a single shared instance, because routers commonly carry
/// per-session mutable state.
pub type RouterFactory = Arc<dyn Fn() -> Arc<dyn SessionRouter> + Send + Sync>;

/// Configuration for one [`super::gateway::Gateway`].
#[derive(Clone)]
pub struct GatewayConfig {
    pub tcp_enable: bool,
    pub tcp_address: String,
    pub tcp_port: u16,
    pub tcp_backlog: u32,

    pub ws_enable: bool,
    pub ws_host: String,
    pub ws_public_host: Option<String>,
    pub ws_port: u16,
    pub ws_path: String,

    pub max_message_bytes: usize,
    pub receive_buffer_bytes: usize,
    pub idle_timeout: Duration,

    pub router_factory: Option<RouterFactory>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            tcp_enable: true,
            tcp_address: DEFAULT_TCP_ADDRESS.to_string(),
            tcp_port: DEFAULT_TCP_PORT,
            tcp_backlog: DEFAULT_TCP_BACKLOG,
            ws_enable: false,
            ws_host: DEFAULT_WS_HOST.to_string(),
            ws_public_host: None,
            ws_port: DEFAULT_WS_PORT,
            ws_path: DEFAULT_WS_PATH.to_string(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            receive_buffer_bytes: DEFAULT_RECEIVE_BUFFER_BYTES,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            router_factory: None,
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Validate configuration values; a missing router factory is rejected here.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.tcp_enable && !self.ws_enable {
            return Err(GatewayError::Config("at least one of tcp_enable/ws_enable must be set".to_string()));
        }
        if self.router_factory.is_none() {
            return Err(GatewayError::Config("router_factory is required".to_string()));
        }
        if self.receive_buffer_bytes < 1024 {
            return Err(GatewayError::Config("receive_buffer_bytes must be >= 1024".to_string()));
        }
        if self.max_message_bytes == 0 {
            return Err(GatewayError::Config("max_message_bytes must be > 0".to_string()));
        }
        if self.idle_timeout.is_zero() {
            return Err(GatewayError::Config("idle_timeout must be > 0".to_string()));
        }
        Ok(())
    }

    /// `ws_path` normalized to end with `/`.
    pub fn normalized_ws_path(&self) -> String {
        if self.ws_path.ends_with('/') {
            self.ws_path.clone()
        } else {
            format!("{}/", self.ws_path)
        }
    }
}

/// Builder for [`GatewayConfig`] with a fluent API.
#[derive(Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn with_tcp(mut self, enable: bool, address: impl Into<String>, port: u16) -> Self {
        self.config.tcp_enable = enable;
        self.config.tcp_address = address.into();
        self.config.tcp_port = port;
        self
    }

    pub fn with_tcp_backlog(mut self, backlog: u32) -> Self {
        self.config.tcp_backlog = backlog;
        self
    }

    pub fn with_ws(mut self, enable: bool, host: impl Into<String>, port: u16) -> Self {
        self.config.ws_enable = enable;
        self.config.ws_host = host.into();
        self.config.ws_port = port;
        self
    }

    pub fn with_ws_public_host(mut self, host: impl Into<String>) -> Self {
        self.config.ws_public_host = Some(host.into());
        self
    }

    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.config.ws_path = path.into();
        self
    }

    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.config.max_message_bytes = max;
        self
    }

    pub fn with_receive_buffer_bytes(mut self, bytes: usize) -> Self {
        self.config.receive_buffer_bytes = bytes;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn with_router_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn SessionRouter> + Send + Sync + 'static,
    {
        self.config.router_factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> Result<GatewayConfig, GatewayError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::router::tests_support::NullRouter;

    #[test]
    fn test_default_requires_router_factory() {
        assert!(matches!(GatewayConfig::default().validate(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_builder_with_router_factory_validates() {
        let config = GatewayConfig::builder()
            .with_router_factory(|| Arc::new(NullRouter) as Arc<dyn SessionRouter>)
            .build()
            .unwrap();
        assert!(config.tcp_enable);
        assert_eq!(config.tcp_port, DEFAULT_TCP_PORT);
    }

    #[test]
    fn test_ws_path_normalization() {
        let config = GatewayConfig { ws_path: "/game".to_string(), ..GatewayConfig::default() };
        assert_eq!(config.normalized_ws_path(), "/game/");
        let config = GatewayConfig { ws_path: "/game/".to_string(), ..GatewayConfig::default() };
        assert_eq!(config.normalized_ws_path(), "/game/");
    }

    #[test]
    fn test_rejects_both_listeners_disabled() {
        let config = GatewayConfig {
            tcp_enable: false,
            ws_enable: false,
            router_factory: Some(Arc::new(|| Arc::new(NullRouter) as Arc<dyn SessionRouter>)),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_undersized_receive_buffer() {
        let config = GatewayConfig {
            receive_buffer_bytes: 10,
            router_factory: Some(Arc::new(|| Arc::new(NullRouter) as Arc<dyn SessionRouter>)),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
