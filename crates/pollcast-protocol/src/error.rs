//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding the long-poll payload.
///
/// `#[derive(thiserror::Error)]` auto-generates the `std::error::Error`
/// implementation; the `#[error("...")]` attributes are the messages that
/// show up in logs.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A single message is too large to frame (its length does not fit in
    /// the `u32` chunk header).
    #[error("chunk of {0} bytes exceeds the u32 length header")]
    ChunkTooLarge(usize),

    /// The payload ended in the middle of a chunk. Either the declared
    /// chunk count is wrong or the body was cut short in transit.
    #[error("payload truncated while reading chunk {index} of {count}")]
    Truncated {
        /// Zero-based index of the chunk being read when the data ran out.
        index: usize,
        /// The declared chunk count.
        count: usize,
    },
}
