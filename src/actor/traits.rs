//! The core Actor trait.
//!
//! An actor is fully generic — no trait objects are involved in its message
//! loop. Heterogeneity only enters at the mailbox boundary, where payloads
//! are opaque (see [`crate::message::Payload`]); the actor type serving one
//! mailbox is fixed and known at spawn time.
//!
//! # Example
//!
//! ```rust
//! use hearth_rt::actor::{Actor, ActorContext};
//! use hearth_rt::message::{CallType, Envelope, Payload};
//! use async_trait::async_trait;
//!
//! struct Echo;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("echo actor error")]
//! struct EchoError;
//!
//! #[async_trait]
//! impl Actor for Echo {
//!     type Error = EchoError;
//!
//!     async fn handle(
//!         &mut self,
//!         envelope: Envelope,
//!         _ctx: &ActorContext,
//!     ) -> Result<Option<Payload>, Self::Error> {
//!         match envelope.call_type {
//!             CallType::Call => Ok(Some(envelope.payload)),
//!             CallType::Send => Ok(None),
//!         }
//!     }
//! }
//! ```

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::{Envelope, Payload};

/// Lifecycle hooks and the per-message handler every actor implements.
///
/// Hooks run in order: [`Actor::on_start`] once before the mailbox is
/// served, [`Actor::handle`] once per queued message, [`Actor::on_error`]
/// when a handler returns `Err`, [`Actor::on_stop`] once during shutdown.
/// A handler error never stops the pump by itself; it only fails the
/// message's response promise, if any, and is reported to `on_error`.
#[async_trait]
pub trait Actor: Send + 'static {
    /// Error type returned by this actor's hooks.
    type Error: Error + Send + Sync + 'static;

    /// Runs once before the mailbox is served. Failure here aborts startup:
    /// the host transitions directly to stopped and the actor is never
    /// published to the registry.
    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Process one envelope. Return `Some(payload)` to answer a `Call`;
    /// `None` is the only valid response to a `Send` (a `Call` handler
    /// that returns `None` is treated by the host as a fault).
    async fn handle(
        &mut self,
        envelope: Envelope,
        ctx: &ActorContext,
    ) -> Result<Option<Payload>, Self::Error>;

    /// Observes a handler error. Does not influence pump control flow —
    /// restart/resume/escalate policy is the caller's responsibility, not
    /// the runtime's.
    async fn on_error(&mut self, _error: Self::Error, _ctx: &ActorContext) {}

    /// Runs once during cancellation, after the mailbox has been drained.
    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::context::{DispatchError, Dispatcher};
    use crate::message::{CallType, Handle, MessageId};
    use std::sync::Arc;
    use std::time::Duration;

    struct NullDispatcher;

    #[async_trait]
    impl Dispatcher for NullDispatcher {
        async fn dispatch_send(&self, _from: Handle, to: Handle, _payload: Payload) -> Result<(), DispatchError> {
            Err(DispatchError::UnknownTarget(to))
        }
        async fn dispatch_call(
            &self,
            _from: Handle,
            to: Handle,
            _payload: Payload,
            _timeout: Option<Duration>,
        ) -> Result<Payload, DispatchError> {
            Err(DispatchError::UnknownTarget(to))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct TestError;

    struct CountingActor {
        handled: u32,
        errored: u32,
    }

    #[async_trait]
    impl Actor for CountingActor {
        type Error = TestError;

        async fn handle(
            &mut self,
            envelope: Envelope,
            _ctx: &ActorContext,
        ) -> Result<Option<Payload>, Self::Error> {
            self.handled += 1;
            if envelope.payload.is_encoded() {
                return Err(TestError);
            }
            match envelope.call_type {
                CallType::Call => Ok(Some(envelope.payload)),
                CallType::Send => Ok(None),
            }
        }

        async fn on_error(&mut self, _error: Self::Error, _ctx: &ActorContext) {
            self.errored += 1;
        }
    }

    fn ctx() -> ActorContext {
        ActorContext::new(Handle::new(1).unwrap(), None, Arc::new(NullDispatcher))
    }

    fn envelope(call_type: CallType, payload: Payload) -> Envelope {
        Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            Handle::new(1).unwrap(),
            call_type,
            payload,
            None,
        )
    }

    #[tokio::test]
    async fn test_call_returns_response() {
        let mut actor = CountingActor { handled: 0, errored: 0 };
        let result = actor
            .handle(envelope(CallType::Call, Payload::local(1u32)), &ctx())
            .await
            .unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_send_returns_none() {
        let mut actor = CountingActor { handled: 0, errored: 0 };
        let result = actor
            .handle(envelope(CallType::Send, Payload::local(1u32)), &ctx())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_default_hooks_are_noops() {
        struct Bare;
        #[async_trait]
        impl Actor for Bare {
            type Error = TestError;
            async fn handle(&mut self, envelope: Envelope, _ctx: &ActorContext) -> Result<Option<Payload>, Self::Error> {
                Ok(Some(envelope.payload))
            }
        }
        let mut actor = Bare;
        assert!(actor.on_start(&ctx()).await.is_ok());
        assert!(actor.on_stop(&ctx()).await.is_ok());
    }
}
