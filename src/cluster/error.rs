//! Cluster transport error taxonomy.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::registry::RegistryError;
use crate::transport::TransportError;

/// Errors raised by the TCP cluster transport.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The underlying socket read/write/connect/bind failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `connect` did not complete within `connect-timeout`.
    #[error("connect to peer timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A frame declared a length exceeding the configured maximum.
    #[error("frame of {len} bytes exceeds the configured maximum of {max}")]
    FrameTooLarge { len: u32, max: u32 },

    /// A frame's header or body could not be parsed.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The handshake exchange failed or was malformed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// An envelope with a `Local` (not yet codec-encoded) payload was handed
    /// to the cluster transport; only `Encoded` payloads may cross the wire.
    #[error("payload must be codec-encoded before crossing the wire")]
    PayloadNotEncoded,

    /// No node descriptor is known for the target node.
    #[error("no route to node {0}")]
    NodeUnreachable(String),

    /// The cluster registry failed to answer a lookup.
    #[error("cluster registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl From<ClusterError> for TransportError {
    fn from(error: ClusterError) -> Self {
        TransportError::Connection(error.to_string())
    }
}
