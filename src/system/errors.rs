//! Actor system error taxonomy.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::DispatchError;
use crate::mailbox::MailboxError;
use crate::message::{CodecError, Handle};
use crate::transport::TransportError;

/// Errors surfaced by [`crate::system::ActorSystem`]'s public operations.
#[derive(Error, Debug)]
pub enum SystemError {
    /// `get_by_handle` / `kill` found no entry for this handle.
    #[error("actor not found: handle {0}")]
    ActorNotFound(Handle),

    /// `get_by_name` / `try_get_handle_by_name` found no entry for this name.
    #[error("actor not found: name {0:?}")]
    NameNotFound(String),

    /// `create` was given a name already held by another actor.
    #[error("name already taken: {0:?}")]
    NameTaken(String),

    /// `create` was given an explicit handle already in use.
    #[error("handle already in use: {0}")]
    HandleInUse(Handle),

    /// The actor's start hook returned an error; the actor was rolled back.
    #[error("actor start hook failed: {0}")]
    StartFailed(String),

    /// `call` exceeded its timeout waiting for a response.
    #[error("call to handle {0} timed out")]
    CallTimeout(Handle),

    /// The actor was destroyed before the call's response promise resolved.
    #[error("call to handle {0} was cancelled")]
    CallCancelled(Handle),

    /// The remote or local handler raised an exception while computing a response.
    #[error("remote fault: {0}")]
    RemoteFault(String),

    /// The response payload's concrete type did not match the caller's expectation.
    #[error("call response type mismatch")]
    TypeMismatch,

    /// The system has reached `max_actors` and cannot create another.
    #[error("actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },

    /// The system is shutting down and no longer accepts new operations.
    #[error("system shutdown in progress")]
    ShuttingDown,

    /// Graceful shutdown did not complete within its configured timeout.
    #[error("shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),

    /// The target actor's mailbox has been destroyed.
    #[error("mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A cluster registry rejected or failed a name claim.
    #[error("cluster registration error: {0}")]
    ClusterRegistration(String),

    /// The response payload could not be decoded to the caller's expected type.
    #[error("payload codec error: {0}")]
    Codec(#[from] CodecError),
}

impl From<TransportError> for SystemError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::UnknownTarget(h) => Self::ActorNotFound(h),
            TransportError::Cancelled => Self::CallCancelled(Handle::NONE),
            TransportError::Connection(message) => Self::RemoteFault(message),
        }
    }
}

impl From<DispatchError> for SystemError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::UnknownTarget(h) => Self::ActorNotFound(h),
            DispatchError::Timeout => Self::CallTimeout(Handle::NONE),
            DispatchError::Cancelled => Self::CallCancelled(Handle::NONE),
            DispatchError::RemoteFault(message) => Self::RemoteFault(message),
            DispatchError::TypeMismatch => Self::TypeMismatch,
        }
    }
}

impl SystemError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CallTimeout(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ShuttingDown | Self::ShutdownTimeout(_))
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}
