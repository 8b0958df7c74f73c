//! The envelope: the immutable metadata record every layer passes around.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::handle::Handle;
use crate::util::trace;

/// Monotonic 64-bit message identifier, unique per process.
///
/// Message-id 1 is the first value allocated in a fresh system; id 0 is never issued so it can double as an absent-id sentinel
/// where needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    /// Wrap a raw value (used when decoding a wire envelope).
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic message-id generator owned by one [`crate::system::ActorSystem`].
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    next: AtomicU64,
}

impl MessageIdGenerator {
    /// Create a generator whose first allocated id is 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next message-id in sequence.
    pub fn allocate(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Fire-and-forget delivery vs. request-response invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    /// Fire-and-forget; no response promise is attached.
    Send,
    /// Request-response; the sender holds a response promise awaiting a reply.
    Call,
}

/// A payload opaque to the runtime core.
///
/// `Local` carries a type-erased, heap-allocated value for in-process
/// delivery — downcast by the receiving handler via [`Payload::downcast`].
/// `Encoded` carries the codec-encoded bytes used for cross-node
/// transmission, tagged with enough information to locate the decoder
/// at the peer.
pub enum Payload {
    /// In-process payload: a boxed value, not yet serialized.
    Local(Box<dyn Any + Send>),
    /// Cross-node payload: codec-encoded bytes plus their declared type tag.
    Encoded { type_tag: String, bytes: Bytes },
}

impl Payload {
    /// Wrap a typed value as a local, in-process payload.
    pub fn local<T: Any + Send>(value: T) -> Self {
        Self::Local(Box::new(value))
    }

    /// Attempt to downcast a local payload back to `T`.
    ///
    /// Returns `None` for encoded payloads (decode them with a
    /// [`crate::message::codec::Codec`] first) or when `T` does not match
    /// the boxed concrete type.
    pub fn downcast<T: Any>(self) -> Option<T> {
        match self {
            Self::Local(boxed) => boxed.downcast::<T>().ok().map(|b| *b),
            Self::Encoded { .. } => None,
        }
    }

    /// True iff this payload still needs codec decoding.
    pub fn is_encoded(&self) -> bool {
        matches!(self, Self::Encoded { .. })
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(_) => f.debug_tuple("Payload::Local").field(&"<opaque>").finish(),
            Self::Encoded { type_tag, bytes } => f
                .debug_struct("Payload::Encoded")
                .field("type_tag", type_tag)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Carries a remote handler's exception or cancellation back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCallFault {
    /// True iff the fault represents a cancellation rather than an exception.
    pub is_cancellation: bool,
    /// A tag identifying the exception's type at the origin node.
    pub type_tag: String,
    /// Human-readable fault message.
    pub message: String,
}

impl RemoteCallFault {
    /// Construct an exception fault.
    pub fn exception(type_tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_cancellation: false,
            type_tag: type_tag.into(),
            message: message.into(),
        }
    }

    /// Construct a cancellation fault.
    pub fn cancellation(message: impl Into<String>) -> Self {
        Self {
            is_cancellation: true,
            type_tag: "cancellation".to_string(),
            message: message.into(),
        }
    }
}

/// Current envelope wire protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Immutable record carrying a payload plus every layer's routing metadata.
///
/// Envelopes are constructed only by the actor system, to guarantee
/// message-id and trace-id propagation — construction is
/// `pub(crate)`; application code never builds one directly, it calls
/// [`crate::system::ActorSystem::send`] / `call`.
#[derive(Debug)]
pub struct Envelope {
    /// Monotonic per-process message identifier.
    pub message_id: MessageId,
    /// Sending actor's handle, or [`Handle::NONE`] if there is no actor sender.
    pub from: Handle,
    /// Target actor's handle.
    pub to: Handle,
    /// Send or Call.
    pub call_type: CallType,
    /// The opaque payload.
    pub payload: Payload,
    /// Opaque per-request identifier propagated through ambient context.
    pub trace_id: String,
    /// Origin wall-clock timestamp.
    pub timestamp: DateTime<Utc>,
    /// Optional time-to-live, in seconds.
    pub ttl: Option<u64>,
    /// Wire protocol version, for forward compatibility across cluster nodes.
    pub version: u32,
}

impl Envelope {
    /// Construct a new request envelope, capturing the ambient trace-id (or
    /// minting a fresh one) and stamping the current wall-clock time.
    pub(crate) fn new(
        message_id: MessageId,
        from: Handle,
        to: Handle,
        call_type: CallType,
        payload: Payload,
        ttl: Option<u64>,
    ) -> Self {
        Self {
            message_id,
            from,
            to,
            call_type,
            payload,
            trace_id: trace::current_trace_id().unwrap_or_else(trace::new_trace_id),
            timestamp: Utc::now(),
            ttl,
            version: PROTOCOL_VERSION,
        }
    }

    /// Derive a response envelope: swap from/to, reuse the message-id, set
    /// call-type = Call.
    pub fn with_response(self, payload: Payload) -> Self {
        Self {
            message_id: self.message_id,
            from: self.to,
            to: self.from,
            call_type: CallType::Call,
            payload,
            trace_id: self.trace_id,
            timestamp: Utc::now(),
            ttl: None,
            version: self.version,
        }
    }

    /// True iff this envelope's TTL has elapsed relative to its origin timestamp.
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) => {
                let elapsed = Utc::now()
                    .signed_duration_since(self.timestamp)
                    .num_seconds()
                    .max(0) as u64;
                elapsed > ttl
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_generator_starts_at_one() {
        let generator = MessageIdGenerator::new();
        assert_eq!(generator.allocate().get(), 1);
        assert_eq!(generator.allocate().get(), 2);
    }

    #[test]
    fn test_payload_local_roundtrip() {
        let payload = Payload::local(42u32);
        assert!(!payload.is_encoded());
        assert_eq!(payload.downcast::<u32>(), Some(42));
    }

    #[test]
    fn test_payload_downcast_mismatch_returns_none() {
        let payload = Payload::local(42u32);
        assert_eq!(payload.downcast::<String>(), None);
    }

    #[test]
    fn test_with_response_swaps_parties_and_reuses_message_id() {
        let from = Handle::new(1).unwrap();
        let to = Handle::new(2).unwrap();
        let req = Envelope::new(
            MessageId::from_raw(7),
            from,
            to,
            CallType::Call,
            Payload::local(1u32),
            None,
        );
        let reply = req.with_response(Payload::local(2u32));
        assert_eq!(reply.message_id.get(), 7);
        assert_eq!(reply.from, to);
        assert_eq!(reply.to, from);
        assert_eq!(reply.call_type, CallType::Call);
    }

    #[test]
    fn test_with_response_twice_restores_original_orientation() {
        let from = Handle::new(1).unwrap();
        let to = Handle::new(2).unwrap();
        let req = Envelope::new(
            MessageId::from_raw(7),
            from,
            to,
            CallType::Call,
            Payload::local(1u32),
            None,
        );
        let once = req.with_response(Payload::local(2u32));
        let twice = once.with_response(Payload::local(3u32));
        assert_eq!(twice.from, from);
        assert_eq!(twice.to, to);
    }

    #[test]
    fn test_ttl_expiration() {
        let mut envelope = Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            Handle::new(1).unwrap(),
            CallType::Send,
            Payload::local(()),
            Some(0),
        );
        envelope.timestamp = Utc::now() - chrono::Duration::seconds(5);
        assert!(envelope.is_expired());
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let envelope = Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            Handle::new(1).unwrap(),
            CallType::Send,
            Payload::local(()),
            None,
        );
        assert!(!envelope.is_expired());
    }
}
