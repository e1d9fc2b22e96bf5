//! The long-poll chunk framing.
//!
//! A long-poll response carries *every* message queued for a session in one
//! body, so the framing must let a client split the body back into discrete
//! messages without any end-of-stream signaling:
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────────┬───────────────┬─ ─ ─
//! │ len: u32 LE  │ payload bytes │ len: u32 LE  │ payload bytes │ ...
//! └──────────────┴───────────────┴──────────────┴───────────────┴─ ─ ─
//! ```
//!
//! The chunk *count* travels out-of-band (a response header in the
//! reference transport), which is why [`decode_chunks`] takes it as an
//! argument and ignores any trailing bytes past the declared count.

use crate::ProtocolError;

/// An encoded long-poll response body plus its out-of-band chunk count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPayload {
    /// Number of chunks in `data`. Reported to the client out-of-band.
    pub count: usize,
    /// The framed body: `count` length-prefixed chunks, back to back.
    pub data: Vec<u8>,
}

/// Frames a batch of messages into one long-poll payload.
///
/// Order is preserved: `messages[0]` becomes the first chunk. An empty
/// batch is valid and produces an empty body with count 0 (the shape of a
/// long-poll timeout).
///
/// # Errors
/// Returns [`ProtocolError::ChunkTooLarge`] if any single message is longer
/// than `u32::MAX` bytes.
pub fn encode_chunks<M: AsRef<[u8]>>(messages: &[M]) -> Result<ChunkPayload, ProtocolError> {
    let total: usize = messages.iter().map(|m| m.as_ref().len() + 4).sum();
    let mut data = Vec::with_capacity(total);

    for message in messages {
        let message = message.as_ref();
        let len = u32::try_from(message.len())
            .map_err(|_| ProtocolError::ChunkTooLarge(message.len()))?;
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(message);
    }

    Ok(ChunkPayload {
        count: messages.len(),
        data,
    })
}

/// Splits a long-poll payload back into its messages.
///
/// Reads exactly `count` chunks; bytes after the last declared chunk are
/// ignored, because the count is authoritative — clients stop reading after
/// it rather than relying on end-of-stream.
///
/// # Errors
/// Returns [`ProtocolError::Truncated`] if the buffer runs out before
/// `count` complete chunks have been read.
pub fn decode_chunks(data: &[u8], count: usize) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut messages = Vec::with_capacity(count);
    let mut rest = data;

    for index in 0..count {
        let truncated = || ProtocolError::Truncated { index, count };

        let (header, body) = rest.split_at_checked(4).ok_or_else(truncated)?;
        // Header slice is exactly 4 bytes, so the array conversion holds.
        let len = u32::from_le_bytes(header.try_into().expect("4-byte header")) as usize;
        let (payload, remaining) = body.split_at_checked(len).ok_or_else(truncated)?;

        messages.push(payload.to_vec());
        rest = remaining;
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    //! The framing is a bit-exact contract with deployed clients, so these
    //! tests assert raw byte layouts, not just round trips.

    use super::*;

    #[test]
    fn test_encode_chunks_exact_byte_layout() {
        let payload = encode_chunks(&[b"ab".as_slice()]).unwrap();
        assert_eq!(payload.count, 1);
        // 2-byte length in little-endian, then the raw bytes.
        assert_eq!(payload.data, vec![0x02, 0x00, 0x00, 0x00, b'a', b'b']);
    }

    #[test]
    fn test_encode_chunks_empty_batch() {
        let payload = encode_chunks::<&[u8]>(&[]).unwrap();
        assert_eq!(payload.count, 0);
        assert!(payload.data.is_empty());
    }

    #[test]
    fn test_encode_chunks_empty_message_is_a_valid_chunk() {
        // An empty message still gets a 4-byte zero-length header.
        let payload = encode_chunks(&[b"".as_slice()]).unwrap();
        assert_eq!(payload.count, 1);
        assert_eq!(payload.data, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_chunks_preserves_order_and_content() {
        let payload = encode_chunks(&[b"first".as_slice(), b"second", b""]).unwrap();
        let messages = decode_chunks(&payload.data, payload.count).unwrap();
        assert_eq!(messages, vec![b"first".to_vec(), b"second".to_vec(), vec![]]);
    }

    #[test]
    fn test_decode_chunks_ignores_trailing_bytes() {
        // The declared count wins over end-of-stream: extra bytes after the
        // last counted chunk must not be interpreted.
        let mut data = encode_chunks(&[b"keep".as_slice()]).unwrap().data;
        data.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let messages = decode_chunks(&data, 1).unwrap();
        assert_eq!(messages, vec![b"keep".to_vec()]);
    }

    #[test]
    fn test_decode_chunks_truncated_header_is_error() {
        let result = decode_chunks(&[0x05, 0x00], 1);
        assert!(matches!(
            result,
            Err(ProtocolError::Truncated { index: 0, count: 1 })
        ));
    }

    #[test]
    fn test_decode_chunks_truncated_body_is_error() {
        // Header says 5 bytes follow, but only 2 do.
        let data = [0x05, 0x00, 0x00, 0x00, b'h', b'i'];
        let result = decode_chunks(&data, 1);
        assert!(matches!(result, Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_decode_chunks_count_beyond_data_is_error() {
        let payload = encode_chunks(&[b"only".as_slice()]).unwrap();
        let result = decode_chunks(&payload.data, 2);
        assert!(matches!(
            result,
            Err(ProtocolError::Truncated { index: 1, count: 2 })
        ));
    }

    #[test]
    fn test_decode_chunks_zero_count_reads_nothing() {
        let messages = decode_chunks(b"whatever", 0).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_binary_content_survives_framing() {
        // Payloads are opaque bytes — NULs and high bytes included.
        let raw = vec![0u8, 255, 1, 0, 128];
        let payload = encode_chunks(&[raw.as_slice()]).unwrap();
        let messages = decode_chunks(&payload.data, payload.count).unwrap();
        assert_eq!(messages, vec![raw]);
    }
}
