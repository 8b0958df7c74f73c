//! Wire framing and envelope (de)serialization for the TCP cluster transport.
//!
//! Every frame on the wire is `[1-byte type][4-byte big-endian length][payload]`.
//! `read_u32`/`write_u32` on a [`tokio::io`] reader/writer already use network
//! (big-endian) byte order, matching the wire format directly.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

// Layer 3: Internal module imports
use super::error::ClusterError;
use crate::message::{CallType, Envelope, Handle, MessageId, Payload};

const FRAME_TYPE_HANDSHAKE: u8 = 1;
const FRAME_TYPE_ENVELOPE: u8 = 2;
const FRAME_TYPE_HEARTBEAT: u8 = 3;

/// Sentinel payload type tag marking a wire envelope as a [`crate::message::RemoteCallFault`]
/// rather than an ordinary application payload.
pub(crate) const REMOTE_CALL_FAULT_TAG: &str = "__hearth_remote_call_fault__";

#[derive(Debug, Serialize, Deserialize)]
struct HandshakePayload {
    node_id: String,
}

/// On-wire shape of an [`Envelope`]: the header fields plus the already
/// codec-encoded payload bytes and their declared type tag.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireEnvelope {
    pub message_id: u64,
    pub from: u64,
    pub to: u64,
    pub call_type: CallType,
    pub trace_id: String,
    pub timestamp: DateTime<Utc>,
    pub ttl: Option<u64>,
    pub version: u32,
    pub payload_type_tag: String,
    pub payload_bytes: Vec<u8>,
}

/// A parsed, type-discriminated frame.
pub(crate) enum DecodedFrame {
    Handshake(String),
    Envelope(WireEnvelope),
    Heartbeat,
}

async fn write_frame<W>(writer: &mut W, frame_type: u8, body: &[u8]) -> Result<(), ClusterError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u8(frame_type).await?;
    writer.write_u32(body.len() as u32).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_frame<R>(reader: &mut R, max_frame_bytes: u32) -> Result<(u8, Vec<u8>), ClusterError>
where
    R: AsyncRead + Unpin,
{
    let frame_type = reader.read_u8().await?;
    let len = reader.read_u32().await?;
    if len > max_frame_bytes {
        return Err(ClusterError::FrameTooLarge { len, max: max_frame_bytes });
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    Ok((frame_type, body))
}

/// Read and type-discriminate the next frame.
pub(crate) async fn read_decoded_frame<R>(
    reader: &mut R,
    max_frame_bytes: u32,
) -> Result<DecodedFrame, ClusterError>
where
    R: AsyncRead + Unpin,
{
    let (frame_type, body) = read_frame(reader, max_frame_bytes).await?;
    match frame_type {
        FRAME_TYPE_HANDSHAKE => {
            let handshake: HandshakePayload = serde_json::from_slice(&body)
                .map_err(|e| ClusterError::InvalidFrame(format!("handshake: {e}")))?;
            Ok(DecodedFrame::Handshake(handshake.node_id))
        }
        FRAME_TYPE_ENVELOPE => {
            let wire: WireEnvelope = serde_json::from_slice(&body)
                .map_err(|e| ClusterError::InvalidFrame(format!("envelope: {e}")))?;
            Ok(DecodedFrame::Envelope(wire))
        }
        FRAME_TYPE_HEARTBEAT => Ok(DecodedFrame::Heartbeat),
        other => Err(ClusterError::InvalidFrame(format!("unknown frame type {other}"))),
    }
}

/// Write this node's handshake frame.
pub(crate) async fn write_handshake<W>(writer: &mut W, local_node_id: &str) -> Result<(), ClusterError>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(&HandshakePayload { node_id: local_node_id.to_string() })
        .map_err(|e| ClusterError::HandshakeFailed(e.to_string()))?;
    write_frame(writer, FRAME_TYPE_HANDSHAKE, &body).await
}

/// Read the peer's handshake frame and return its node-id.
///
/// Fails if the first frame on a fresh connection is anything other than a
/// handshake.
pub(crate) async fn read_handshake<R>(reader: &mut R, max_frame_bytes: u32) -> Result<String, ClusterError>
where
    R: AsyncRead + Unpin,
{
    match read_decoded_frame(reader, max_frame_bytes).await? {
        DecodedFrame::Handshake(node_id) => Ok(node_id),
        _ => Err(ClusterError::HandshakeFailed("expected handshake as first frame".to_string())),
    }
}

/// Write an empty heartbeat frame.
pub(crate) async fn write_heartbeat<W>(writer: &mut W) -> Result<(), ClusterError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, FRAME_TYPE_HEARTBEAT, &[]).await
}

/// Write an already-built [`WireEnvelope`] as an envelope frame.
pub(crate) async fn write_envelope_frame<W>(writer: &mut W, wire: &WireEnvelope) -> Result<(), ClusterError>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(wire).map_err(|e| ClusterError::InvalidFrame(e.to_string()))?;
    write_frame(writer, FRAME_TYPE_ENVELOPE, &body).await
}

/// Convert a local [`Envelope`] to its wire shape. Fails if the payload has
/// not been codec-encoded yet — cross-node transmission requires an
/// `Encoded` payload; callers must pre-encode with [`crate::message::codec::Codec`].
pub(crate) fn envelope_to_wire(envelope: &Envelope) -> Result<WireEnvelope, ClusterError> {
    let (payload_type_tag, payload_bytes) = match &envelope.payload {
        Payload::Encoded { type_tag, bytes } => (type_tag.clone(), bytes.to_vec()),
        Payload::Local(_) => return Err(ClusterError::PayloadNotEncoded),
    };
    Ok(WireEnvelope {
        message_id: envelope.message_id.get(),
        from: envelope.from.get(),
        to: envelope.to.get(),
        call_type: envelope.call_type,
        trace_id: envelope.trace_id.clone(),
        timestamp: envelope.timestamp,
        ttl: envelope.ttl,
        version: envelope.version,
        payload_type_tag,
        payload_bytes,
    })
}

/// Reconstruct an [`Envelope`] from its wire shape.
pub(crate) fn wire_to_envelope(wire: WireEnvelope) -> Result<Envelope, ClusterError> {
    let to = Handle::new(wire.to)
        .ok_or_else(|| ClusterError::InvalidFrame("envelope target handle is zero".to_string()))?;
    Ok(Envelope {
        message_id: MessageId::from_raw(wire.message_id),
        from: Handle::new(wire.from).unwrap_or(Handle::NONE),
        to,
        call_type: wire.call_type,
        payload: Payload::Encoded { type_tag: wire.payload_type_tag, bytes: Bytes::from(wire.payload_bytes) },
        trace_id: wire.trace_id,
        timestamp: wire.timestamp,
        ttl: wire.ttl,
        version: wire.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_handshake_roundtrip() {
        let mut buf = Vec::new();
        write_handshake(&mut buf, "node-a").await.unwrap();
        let mut cursor = Cursor::new(buf);
        let node_id = read_handshake(&mut cursor, 1024).await.unwrap();
        assert_eq!(node_id, "node-a");
    }

    #[tokio::test]
    async fn test_heartbeat_roundtrip() {
        let mut buf = Vec::new();
        write_heartbeat(&mut buf).await.unwrap();
        let mut cursor = Cursor::new(buf);
        let frame = read_decoded_frame(&mut cursor, 1024).await.unwrap();
        assert!(matches!(frame, DecodedFrame::Heartbeat));
    }

    #[tokio::test]
    async fn test_envelope_frame_roundtrip() {
        let envelope = Envelope::new(
            MessageId::from_raw(7),
            Handle::new(1).unwrap(),
            Handle::new(2).unwrap(),
            CallType::Call,
            Payload::Encoded { type_tag: "ping".to_string(), bytes: Bytes::from_static(b"{}") },
            Some(30),
        );
        let wire = envelope_to_wire(&envelope).unwrap();
        let mut buf = Vec::new();
        write_envelope_frame(&mut buf, &wire).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_decoded_frame(&mut cursor, 1024).await.unwrap();
        let DecodedFrame::Envelope(decoded) = frame else {
            panic!("expected an envelope frame");
        };
        let reconstructed = wire_to_envelope(decoded).unwrap();
        assert_eq!(reconstructed.message_id.get(), 7);
        assert_eq!(reconstructed.from.get(), 1);
        assert_eq!(reconstructed.to.get(), 2);
        assert_eq!(reconstructed.ttl, Some(30));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut buf = Vec::new();
        write_heartbeat(&mut buf).await.unwrap();
        write_envelope_frame(
            &mut buf,
            &WireEnvelope {
                message_id: 1,
                from: 0,
                to: 1,
                call_type: CallType::Send,
                trace_id: "t".to_string(),
                timestamp: Utc::now(),
                ttl: None,
                version: 1,
                payload_type_tag: "x".to_string(),
                payload_bytes: vec![0u8; 64],
            },
        )
        .await
        .unwrap();

        let mut cursor = Cursor::new(buf);
        let _ = read_decoded_frame(&mut cursor, 1024).await.unwrap();
        let result = read_decoded_frame(&mut cursor, 8).await;
        assert!(matches!(result, Err(ClusterError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_local_payload_refuses_wire_conversion() {
        let envelope = Envelope::new(
            MessageId::from_raw(1),
            Handle::NONE,
            Handle::new(1).unwrap(),
            CallType::Send,
            Payload::local(42u32),
            None,
        );
        assert!(matches!(envelope_to_wire(&envelope), Err(ClusterError::PayloadNotEncoded)));
    }

    proptest! {
        /// `envelope_to_wire` followed by a frame round-trip and
        /// `wire_to_envelope` is the identity on every header field, for any
        /// message-id/handle/ttl/payload bytes combination.
        #[test]
        fn prop_envelope_frame_roundtrip_is_identity(
            message_id in 1u64..=u64::MAX,
            from in 0u64..=u64::MAX,
            to in 1u64..=u64::MAX,
            is_call in any::<bool>(),
            ttl in proptest::option::of(0u64..100_000),
            payload_bytes in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let call_type = if is_call { CallType::Call } else { CallType::Send };
            let envelope = Envelope::new(
                MessageId::from_raw(message_id),
                Handle::new(from).unwrap_or(Handle::NONE),
                Handle::new(to).unwrap(),
                call_type,
                Payload::Encoded { type_tag: "prop".to_string(), bytes: Bytes::from(payload_bytes.clone()) },
                ttl,
            );

            let wire = envelope_to_wire(&envelope).unwrap();

            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let reconstructed = runtime.block_on(async {
                let mut buf = Vec::new();
                write_envelope_frame(&mut buf, &wire).await.unwrap();
                let mut cursor = Cursor::new(buf);
                let DecodedFrame::Envelope(decoded) = read_decoded_frame(&mut cursor, 1 << 20).await.unwrap() else {
                    panic!("expected an envelope frame");
                };
                wire_to_envelope(decoded).unwrap()
            });

            prop_assert_eq!(reconstructed.message_id.get(), message_id);
            prop_assert_eq!(reconstructed.from.get(), from);
            prop_assert_eq!(reconstructed.to.get(), to);
            prop_assert_eq!(reconstructed.call_type, call_type);
            prop_assert_eq!(reconstructed.ttl, ttl);
            let Payload::Encoded { bytes, .. } = reconstructed.payload else {
                panic!("expected an encoded payload");
            };
            prop_assert_eq!(bytes.to_vec(), payload_bytes);
        }
    }
}
