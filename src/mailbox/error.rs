//! Mailbox error taxonomy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Failure modes for enqueueing onto a mailbox.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailboxError {
    /// The actor has already been destroyed; its mailbox no longer accepts writes.
    #[error("actor has been destroyed, mailbox closed to new writes")]
    Destroyed,
}

impl MailboxError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}
