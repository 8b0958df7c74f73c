//! Gateway error taxonomy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::DispatchError;
use crate::system::SystemError;

/// Errors raised by the gateway, its listeners, and its session actors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The underlying socket accept/read/write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration failed validation, e.g. a missing `router_factory`.
    #[error("configuration error: {0}")]
    Config(String),

    /// Framing or message validation failed.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A reassembled message exceeded `max_message_bytes`.
    #[error("message of {len} bytes exceeds the configured maximum of {max}")]
    MessageTooLarge { len: usize, max: usize },

    /// The WebSocket upgrade or stream failed.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// The session actor received a payload that was not a recognized session message.
    #[error("unexpected payload delivered to session actor")]
    UnexpectedPayload,

    /// Routing a session's forward/call through the actor system failed.
    #[error("session dispatch error: {0}")]
    Dispatch(String),
}

impl From<DispatchError> for GatewayError {
    fn from(error: DispatchError) -> Self {
        Self::Dispatch(error.to_string())
    }
}

impl From<SystemError> for GatewayError {
    fn from(error: SystemError) -> Self {
        Self::Dispatch(error.to_string())
    }
}
