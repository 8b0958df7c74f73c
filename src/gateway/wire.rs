//! Gateway TCP framing: `[4-byte big-endian length][payload]`.
//!
//! Distinct from the cluster wire format in [`crate::cluster::protocol`]: no
//! type byte, and the length is read as a signed `i32` specifically so a
//! negative value is detectable and rejected rather than wrapping to a huge
//! unsigned length.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// Layer 3: Internal module imports
use super::error::GatewayError;

pub(crate) async fn read_frame<R>(reader: &mut R, max_message_bytes: usize) -> Result<Vec<u8>, GatewayError>
where
    R: AsyncReadExt + Unpin,
{
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = i32::from_be_bytes(len_bytes);
    if len < 0 {
        return Err(GatewayError::ProtocolViolation(format!("negative frame length {len}")));
    }
    let len = len as usize;
    if len > max_message_bytes {
        return Err(GatewayError::MessageTooLarge { len, max: max_message_bytes });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

pub(crate) async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), GatewayError>
where
    W: AsyncWriteExt + Unpin,
{
    let len = i32::try_from(payload.len())
        .map_err(|_| GatewayError::MessageTooLarge { len: payload.len(), max: i32::MAX as usize })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_round_trip() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"hello").await.unwrap();
        let mut cursor = Cursor::new(buffer);
        let payload = read_frame(&mut cursor, 1024).await.unwrap();
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn test_negative_length_is_protocol_violation() {
        let mut cursor = Cursor::new((-1i32).to_be_bytes().to_vec());
        let error = read_frame(&mut cursor, 1024).await.unwrap_err();
        assert!(matches!(error, GatewayError::ProtocolViolation(_)));
    }

    #[tokio::test]
    async fn test_oversized_length_is_message_too_large() {
        let mut cursor = Cursor::new(100i32.to_be_bytes().to_vec());
        let error = read_frame(&mut cursor, 10).await.unwrap_err();
        assert!(matches!(error, GatewayError::MessageTooLarge { len: 100, max: 10 }));
    }

    #[tokio::test]
    async fn test_empty_payload_round_trips() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"").await.unwrap();
        let mut cursor = Cursor::new(buffer);
        let payload = read_frame(&mut cursor, 1024).await.unwrap();
        assert!(payload.is_empty());
    }

    /// `read_frame` issues two `read_exact` calls (length, then payload);
    /// a mock reader that only ever yields the bytes in separate chunks
    /// exercises that each call actually waits for its own chunk rather
    /// than assuming one `read_exact` is satisfied by one `poll_read`.
    #[tokio::test]
    async fn test_read_frame_across_split_reads() {
        let mut mock = tokio_test::io::Builder::new()
            .read(&5i32.to_be_bytes())
            .read(b"he")
            .read(b"llo")
            .build();
        let payload = read_frame(&mut mock, 1024).await.unwrap();
        assert_eq!(payload, b"hello");
    }
}
