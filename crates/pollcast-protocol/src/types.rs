//! Identity types shared between the session core and the transport layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a session.
///
/// This is a newtype wrapper around `u64` — you can't accidentally pass a
/// player id or a chunk count where a `SessionId` is expected, even though
/// they may all be integers underneath.
///
/// Ids are allocated by the session manager, strictly increase over the
/// process lifetime, and are **never reused** — a stale client holding an
/// old id can never be routed to a newer, unrelated session.
///
/// `#[serde(transparent)]` makes `SessionId(42)` serialize as plain `42`,
/// which is what clients put in the session-id header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means SessionId(42) → `42`, not `{"0":42}`.
        let json = serde_json::to_string(&SessionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_session_id_deserializes_from_plain_number() {
        let id: SessionId = serde_json::from_str("42").unwrap();
        assert_eq!(id, SessionId(42));
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId(7).to_string(), "S-7");
    }

    #[test]
    fn test_session_id_ordering() {
        // Strictly-increasing allocation relies on Ord behaving like u64.
        assert!(SessionId(2) > SessionId(1));
    }
}
