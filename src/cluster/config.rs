//! TCP cluster transport configuration.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Default timeout for establishing an outbound peer connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cadence for keep-alive heartbeat frames.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Default maximum frame body size, guarding against a malicious or
/// corrupted length prefix driving an unbounded allocation.
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Configuration for one [`super::transport::ClusterTransport`].
#[derive(Debug, Clone)]
pub struct ClusterTransportConfig {
    /// Timeout for `TcpStream::connect` to a peer.
    pub connect_timeout: Duration,

    /// Cadence at which idle connections exchange heartbeat frames.
    /// A zero duration disables heartbeats entirely.
    pub heartbeat_interval: Duration,

    /// Maximum accepted frame body length, in bytes.
    pub max_frame_bytes: u32,
}

impl Default for ClusterTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ClusterTransportConfig {
    pub fn builder() -> ClusterTransportConfigBuilder {
        ClusterTransportConfigBuilder::default()
    }
}

/// Builder for [`ClusterTransportConfig`] with a fluent API.
#[derive(Debug, Default)]
pub struct ClusterTransportConfigBuilder {
    config: ClusterTransportConfig,
}

impl ClusterTransportConfigBuilder {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn with_max_frame_bytes(mut self, max: u32) -> Self {
        self.config.max_frame_bytes = max;
        self
    }

    pub fn build(self) -> ClusterTransportConfig {
        self.config
    }
}
