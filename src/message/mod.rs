//! Handles, envelopes, and the payload codec.
//!
//! Every other layer builds on this one: a [`Handle`] names an actor, an
//! [`Envelope`] carries a message plus its routing metadata, and [`Codec`]
//! turns an opaque [`Payload`] into wire bytes when an envelope must cross a
//! node boundary.

pub mod codec;
pub mod envelope;
pub mod handle;

pub use codec::{Codec, CodecError, TypedTag};
pub use envelope::{CallType, Envelope, MessageId, MessageIdGenerator, Payload, RemoteCallFault, PROTOCOL_VERSION};
pub use handle::{Handle, HandleAllocator};
