//! Error types for the session layer.

use pollcast_protocol::SessionId;

/// Errors that can occur during session management.
///
/// Deliberately sparse: failure variants never carry token material or any
/// detail that would let a caller probe for live sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The presented credential did not verify against the stored hash.
    ///
    /// This variant is intentionally opaque — "wrong secret" and "the
    /// verifier itself failed" are indistinguishable to the caller, so a
    /// malformed stored hash can't be used as an oracle.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The operation was attempted after the session was torn down.
    /// Recoverable: treat the session as gone and re-authenticate.
    #[error("session is torn down")]
    SessionClosed,

    /// No session exists for the given id. Callers must treat this as
    /// unauthorized, not as a server fault.
    #[error("session {0} not found")]
    NotFound(SessionId),
}

/// The outgoing queue was closed before the operation.
///
/// The queue is usable standalone, so it gets its own error type; the
/// session boundary converts it to [`SessionError::SessionClosed`].
#[derive(Debug, thiserror::Error)]
#[error("outgoing queue is closed")]
pub struct QueueClosed;

impl From<QueueClosed> for SessionError {
    fn from(_: QueueClosed) -> Self {
        SessionError::SessionClosed
    }
}
