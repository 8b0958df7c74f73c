//! Pluggable payload codec and the module-load-time type-tag registry.
//!
//! Re-architecture hint: the source generates RPC proxies/dispatchers at
//! compile time from service interfaces. Here that collapses to a registry of
//! `(type tag → decoder)` populated when decoders are registered, not a
//! compile-time proxy synthesis step.

// Layer 1: Standard library imports
use std::any::Any;
use std::marker::PhantomData;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// Layer 3: Internal module imports
use super::envelope::Payload;

/// Errors raised while encoding or decoding a payload.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The declared payload type tag has no registered decoder at this peer.
    #[error("no decoder registered for payload type tag: {0}")]
    UnknownTypeTag(String),

    /// The payload's bytes did not deserialize into the tag's registered shape.
    #[error("payload decode failed: {0}")]
    Decode(String),

    /// The payload failed to serialize.
    #[error("payload encode failed: {0}")]
    Encode(String),
}

type DecodeFn = Box<dyn Fn(&[u8]) -> Result<Box<dyn Any + Send>, CodecError> + Send + Sync>;

/// Registry of `(payload type tag → decoder)`, plus encode/decode entry points.
///
/// One [`Codec`] is shared cluster-wide per process; every payload type that
/// may cross the wire must have its decoder registered before the first
/// envelope referencing it is received, mirroring the source's load-time
/// proxy registration.
pub struct Codec {
    decoders: DashMap<String, DecodeFn>,
}

impl Codec {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self {
            decoders: DashMap::new(),
        }
    }

    /// Register the decoder for payload type `T` under `type_tag`.
    pub fn register<T>(&self, type_tag: impl Into<String>)
    where
        T: DeserializeOwned + Send + 'static,
    {
        let tag = type_tag.into();
        self.decoders.insert(
            tag,
            Box::new(|bytes| {
                serde_json::from_slice::<T>(bytes)
                    .map(|value| Box::new(value) as Box<dyn Any + Send>)
                    .map_err(|e| CodecError::Decode(e.to_string()))
            }),
        );
    }

    /// Encode `value` as a payload declared under `type_tag`.
    pub fn encode<T: Serialize>(
        &self,
        type_tag: impl Into<String>,
        value: &T,
    ) -> Result<Payload, CodecError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(Payload::Encoded {
            type_tag: type_tag.into(),
            bytes: Bytes::from(bytes),
        })
    }

    /// Decode a payload, resolving the decoder by its declared type tag.
    ///
    /// Local payloads pass through unchanged (no decoder lookup needed); the
    /// caller downcasts them with [`Payload::downcast`] as usual.
    pub fn decode(&self, payload: Payload) -> Result<Box<dyn Any + Send>, CodecError> {
        match payload {
            Payload::Local(boxed) => Ok(boxed),
            Payload::Encoded { type_tag, bytes } => {
                let decoder = self
                    .decoders
                    .get(&type_tag)
                    .ok_or_else(|| CodecError::UnknownTypeTag(type_tag.clone()))?;
                decoder(&bytes)
            }
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed convenience handle bound to one payload type, for callers who only
/// ever send/receive a single message shape over a given type tag.
pub struct TypedTag<T> {
    tag: String,
    _marker: PhantomData<T>,
}

impl<T> TypedTag<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Register `T`'s decoder under `tag` and return a handle for future encodes.
    pub fn register(codec: &Codec, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        codec.register::<T>(tag.clone());
        Self {
            tag,
            _marker: PhantomData,
        }
    }

    /// Encode `value` under this tag.
    pub fn encode(&self, codec: &Codec, value: &T) -> Result<Payload, CodecError> {
        codec.encode(self.tag.clone(), value)
    }
}
