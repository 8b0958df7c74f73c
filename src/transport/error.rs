//! Transport error taxonomy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::message::Handle;

/// Errors surfaced by a [`super::Transport`] implementation.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// Neither the local actor table nor the cluster registry knows this target.
    #[error("target actor {0} is unknown")]
    UnknownTarget(Handle),

    /// The send was cancelled before dispatch.
    #[error("send was cancelled before dispatch")]
    Cancelled,

    /// The underlying connection to a remote peer failed.
    #[error("connection error: {0}")]
    Connection(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownTarget(_))
    }
}
