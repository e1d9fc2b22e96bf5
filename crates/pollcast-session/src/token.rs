//! The session credential: a fixed-length random token with constant-time
//! comparison.
//!
//! A token is the secret half of the `{session id, token}` capability pair a
//! client presents on every call. Two properties matter here:
//!
//! 1. **Unguessable** — 64 bytes (512 bits) of CSPRNG output.
//! 2. **Timing-safe** — comparison cost must not depend on where the first
//!    differing byte sits, so an attacker can't recover the token byte by
//!    byte from response latency. `==` on byte slices short-circuits, which
//!    is exactly the leak we need to avoid; we go through
//!    [`subtle::ConstantTimeEq`] instead.

use std::fmt;

use rand::Rng;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Length of the raw token in bytes.
pub const TOKEN_LEN: usize = 64;

/// Length of the hex encoding clients echo back (two chars per byte).
pub const ENCODED_LEN: usize = TOKEN_LEN * 2;

/// A fixed-length random session credential.
///
/// Immutable once generated; [`clear`](Self::clear) zeroes it on teardown,
/// after which no candidate ever matches again.
pub struct SecureToken {
    raw: [u8; TOKEN_LEN],
    /// Lowercase-hex form of `raw`. Kept precomputed because this is what
    /// clients send back, so every `matches` compares against it directly
    /// without a decode step that could itself leak timing.
    hex: [u8; ENCODED_LEN],
    cleared: bool,
}

impl SecureToken {
    /// Generates a fresh token from the thread-local CSPRNG. Infallible.
    pub fn generate() -> Self {
        let mut raw = [0u8; TOKEN_LEN];
        rand::rng().fill(&mut raw[..]);

        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut hex = [0u8; ENCODED_LEN];
        for (i, b) in raw.iter().enumerate() {
            hex[i * 2] = DIGITS[(b >> 4) as usize];
            hex[i * 2 + 1] = DIGITS[(b & 0x0f) as usize];
        }

        Self {
            raw,
            hex,
            cleared: false,
        }
    }

    /// The stable external encoding of the token — the exact string a
    /// client must present on subsequent calls.
    ///
    /// Only meaningful while the token is live; after [`clear`](Self::clear)
    /// the returned bytes are all zero.
    pub fn external_form(&self) -> &str {
        // The hex alphabet is ASCII and the cleared state is all NUL bytes,
        // both valid UTF-8.
        std::str::from_utf8(&self.hex).expect("hex encoding is ASCII")
    }

    /// Compares a candidate against the token in constant time.
    ///
    /// The candidate is expected in the same encoding as
    /// [`external_form`](Self::external_form). A length mismatch returns
    /// false immediately — the expected length is public knowledge, not a
    /// secret. For equal-length input the comparison touches every byte
    /// regardless of where a mismatch occurs, and a cleared token is folded
    /// in as a [`Choice`] rather than an early return so the cost stays
    /// flat.
    pub fn matches(&self, candidate: impl AsRef<[u8]>) -> bool {
        let candidate = candidate.as_ref();
        if candidate.len() != ENCODED_LEN {
            return false;
        }

        let matched = candidate.ct_eq(&self.hex);
        let live = Choice::from(u8::from(!self.cleared));
        bool::from(matched & live)
    }

    /// Zeroes the token. Idempotent; every later `matches` returns false,
    /// including for a candidate of all zero bytes.
    pub fn clear(&mut self) {
        self.raw.zeroize();
        self.hex.zeroize();
        self.cleared = true;
    }

    /// Whether the token has been cleared.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

impl Drop for SecureToken {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Debug must never print token material — it would end up in logs.
impl fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureToken")
            .field("cleared", &self.cleared)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_external_form_is_128_hex_chars() {
        let token = SecureToken::generate();
        let form = token.external_form();
        assert_eq!(form.len(), ENCODED_LEN);
        assert!(form.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(
            form.chars().all(|c| !c.is_ascii_uppercase()),
            "encoding must be lowercase hex"
        );
    }

    #[test]
    fn test_generate_tokens_are_unique() {
        let a = SecureToken::generate();
        let b = SecureToken::generate();
        assert_ne!(a.external_form(), b.external_form());
    }

    #[test]
    fn test_matches_accepts_own_external_form() {
        let token = SecureToken::generate();
        let form = token.external_form().to_owned();
        assert!(token.matches(&form));
    }

    #[test]
    fn test_matches_rejects_single_byte_difference() {
        let token = SecureToken::generate();
        let mut form = token.external_form().to_owned().into_bytes();
        // Flip one hex digit somewhere in the middle.
        form[64] = if form[64] == b'0' { b'1' } else { b'0' };
        assert!(!token.matches(&form));
    }

    #[test]
    fn test_matches_rejects_wrong_length() {
        let token = SecureToken::generate();
        let form = token.external_form().to_owned();
        assert!(!token.matches(&form[..ENCODED_LEN - 1]));
        assert!(!token.matches(format!("{form}0")));
        assert!(!token.matches(""));
    }

    #[test]
    fn test_clear_rejects_everything_afterwards() {
        let mut token = SecureToken::generate();
        let form = token.external_form().to_owned();

        token.clear();

        assert!(token.is_cleared());
        assert!(!token.matches(&form), "old form must not match");
        // A zeroed token's hex buffer is all NUL bytes — an attacker
        // sending 128 NULs must still be rejected.
        assert!(!token.matches(vec![0u8; ENCODED_LEN]));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut token = SecureToken::generate();
        token.clear();
        token.clear();
        assert!(token.is_cleared());
    }

    #[test]
    fn test_debug_redacts_token_material() {
        let token = SecureToken::generate();
        let printed = format!("{token:?}");
        assert!(!printed.contains(token.external_form()));
    }
}
