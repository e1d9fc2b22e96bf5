//! Unified error type for the Pollcast engine.

use pollcast_protocol::ProtocolError;
use pollcast_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `pollcast` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PollcastError {
    /// A wire-level error (chunk encode/decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, expiry, teardown).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An event record could not be encoded or decoded.
    #[error("invalid event record: {0}")]
    InvalidEvent(&'static str),
}
