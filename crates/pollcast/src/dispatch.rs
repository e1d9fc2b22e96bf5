//! The authorization boundary between a transport and the session core.
//!
//! A transport (HTTP headers in the reference deployment) hands over two
//! raw strings — a claimed session id and a claimed token — straight from
//! the network. Neither is trusted: this module turns them into exactly one
//! of three outcomes without ever letting malformed input panic or reach
//! the session core as anything but a clean lookup.
//!
//! The contract the transport relies on:
//!
//! | input                                   | outcome        |
//! |-----------------------------------------|----------------|
//! | malformed or unknown session id         | `Unauthorized` |
//! | unparseable or oversized token          | `Unauthorized` |
//! | known session, token fails validation   | `Forbidden`    |
//! | known session, token validates          | `Granted`      |
//!
//! A `Granted` validation bumps the session's deadline — presenting a
//! valid credential *is* the keep-alive. The two rejection outcomes carry
//! nothing: no id, no session handle, no hint of whether the id exists.

use std::sync::Arc;

use pollcast_protocol::SessionId;
use pollcast_session::{CredentialVerifier, ENCODED_LEN, Session, SessionManager};

/// Longest accepted decimal session id. A `u64` never needs more than 20
/// digits, so anything longer is garbage before we even parse.
const MAX_ID_CHARS: usize = 20;

/// Longest accepted raw token. Twice the real encoding leaves room for a
/// client that wraps or pads the value, while still bounding the bytes the
/// constant-time comparison path ever sees.
const MAX_TOKEN_CHARS: usize = ENCODED_LEN * 2;

/// The outcome of authorizing one raw `{id, token}` pair.
#[derive(Debug)]
pub enum Access {
    /// The pair named a live session and the token validated. The deadline
    /// has already been bumped.
    Granted(Arc<Session>),
    /// The id was malformed, unknown, or the token was unparseable. The
    /// caller learns nothing about why.
    Unauthorized,
    /// The id named a live session but the token failed validation.
    Forbidden,
}

impl Access {
    /// Convenience for tests and handlers that only care about success.
    pub fn granted(self) -> Option<Arc<Session>> {
        match self {
            Access::Granted(session) => Some(session),
            Access::Unauthorized | Access::Forbidden => None,
        }
    }
}

/// Parses a raw session id: ASCII decimal digits only, hard length cap.
///
/// Anything else — empty input, signs, whitespace, control characters,
/// embedded NUL, absurdly long digit strings — is `None`. The parse itself
/// cannot overflow because the length cap keeps the value within `u64`
/// checked-parse range.
pub fn parse_session_id(raw: &str) -> Option<SessionId> {
    if raw.is_empty() || raw.len() > MAX_ID_CHARS {
        return None;
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().map(SessionId)
}

/// Screens a raw token before it touches the comparison path: printable
/// ASCII only, bounded length. Returns the input unchanged when it passes.
///
/// This is a shape check, not validation — a garbage-but-printable token
/// still goes to the session and fails there, in constant time.
pub fn sanitize_token(raw: &str) -> Option<&str> {
    if raw.is_empty() || raw.len() > MAX_TOKEN_CHARS {
        return None;
    }
    if !raw.bytes().all(|b| (0x21..=0x7e).contains(&b)) {
        return None;
    }
    Some(raw)
}

/// Authorizes one raw `{id, token}` pair against the session manager.
///
/// Successful validation bumps the session deadline. See the module docs
/// for the full outcome table.
pub fn authorize<V: CredentialVerifier>(
    manager: &SessionManager<V>,
    raw_id: &str,
    raw_token: &str,
) -> Access {
    let Some(id) = parse_session_id(raw_id) else {
        tracing::debug!("rejected malformed session id");
        return Access::Unauthorized;
    };
    let Some(token) = sanitize_token(raw_token) else {
        tracing::debug!(%id, "rejected malformed token");
        return Access::Unauthorized;
    };
    let Some(session) = manager.get(id) else {
        return Access::Unauthorized;
    };

    if session.validate(token, true) {
        Access::Granted(session)
    } else {
        tracing::debug!(%id, "token validation failed");
        Access::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pollcast_session::CredentialError;

    struct NoVerifier;

    impl CredentialVerifier for NoVerifier {
        async fn verify(&self, _: &str, _: &str) -> Result<bool, CredentialError> {
            Ok(false)
        }
    }

    fn manager() -> SessionManager<NoVerifier> {
        SessionManager::new("unused", NoVerifier)
    }

    #[test]
    fn test_parse_session_id_accepts_plain_digits() {
        assert_eq!(parse_session_id("42"), Some(SessionId(42)));
        assert_eq!(parse_session_id("1"), Some(SessionId(1)));
    }

    #[test]
    fn test_parse_session_id_rejects_garbage() {
        for raw in [
            "",
            "-1",
            "+1",
            " 42",
            "42 ",
            "4 2",
            "0x1f",
            "S-42",
            "42\0",
            "\u{202e}42",
            "99999999999999999999999999",  // over the length cap
            "999999999999999999999",       // 21 digits
            "18446744073709551616",        // u64::MAX + 1, 20 digits
        ] {
            assert_eq!(parse_session_id(raw), None, "must reject {raw:?}");
        }
    }

    #[test]
    fn test_sanitize_token_accepts_hex_shaped_input() {
        let token = "a".repeat(ENCODED_LEN);
        assert_eq!(sanitize_token(&token), Some(token.as_str()));
    }

    #[test]
    fn test_sanitize_token_rejects_control_chars_and_oversize() {
        assert!(sanitize_token("").is_none());
        assert!(sanitize_token("abc\0def").is_none());
        assert!(sanitize_token("abc\ndef").is_none());
        assert!(sanitize_token("abc def").is_none());
        assert!(sanitize_token(&"a".repeat(MAX_TOKEN_CHARS + 1)).is_none());
    }

    #[tokio::test]
    async fn test_authorize_valid_pair_is_granted_and_bumps() {
        let mgr = manager();
        let ses = mgr.start_session(Duration::from_secs(30));
        let before = ses.deadline().unwrap();
        let token = ses.external_token();

        let access = authorize(&mgr, &ses.id().0.to_string(), &token);

        let granted = access.granted().expect("must be granted");
        assert_eq!(granted.id(), ses.id());
        assert!(granted.deadline().unwrap() >= before);
    }

    #[tokio::test]
    async fn test_authorize_unknown_id_is_unauthorized() {
        let mgr = manager();
        let access = authorize(&mgr, "12345", &"a".repeat(ENCODED_LEN));
        assert!(matches!(access, Access::Unauthorized));
    }

    #[tokio::test]
    async fn test_authorize_malformed_inputs_never_panic() {
        let mgr = manager();
        let ses = mgr.start_session(Duration::from_secs(30));
        let id = ses.id().0.to_string();

        for (raw_id, raw_token) in [
            ("not-a-number", "token"),
            ("99999999999999999999999", "token"),
            ("\0\0\0", "token"),
            (id.as_str(), ""),
            (id.as_str(), "has spaces in it"),
            (id.as_str(), "\u{1f600}"),
        ] {
            let access = authorize(&mgr, raw_id, raw_token);
            assert!(matches!(access, Access::Unauthorized));
        }
    }

    #[tokio::test]
    async fn test_authorize_wrong_token_on_live_session_is_forbidden() {
        let mgr = manager();
        let ses = mgr.start_session(Duration::from_secs(30));

        let wrong = "0".repeat(ENCODED_LEN);
        let access = authorize(&mgr, &ses.id().0.to_string(), &wrong);

        assert!(matches!(access, Access::Forbidden));
        assert!(ses.is_live(), "a failed attempt must not kill the session");
    }

    #[tokio::test]
    async fn test_authorize_torn_down_session_is_unauthorized() {
        let mgr = manager();
        let ses = mgr.start_session(Duration::from_secs(30));
        let id = ses.id().0.to_string();
        let token = ses.external_token();

        ses.teardown();

        // Teardown removed the session from the manager: the id no longer
        // resolves, indistinguishable from an id that never existed.
        let access = authorize(&mgr, &id, &token);
        assert!(matches!(access, Access::Unauthorized));
    }
}
