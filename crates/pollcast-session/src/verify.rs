//! Credential verification hook for minting sessions.
//!
//! Pollcast does not pick your password-hashing scheme — it defines the
//! [`CredentialVerifier`] trait and ships an Argon2id implementation that
//! matches the reference deployment. Tests inject a trivial verifier; a
//! deployment that stores its shared secret differently implements the
//! trait once and the session manager never knows the difference.
//!
//! Whatever the implementation, the manager collapses *every* failure —
//! wrong secret, malformed stored hash, verifier unavailable — into one
//! opaque `AuthenticationFailed`, so the error channel can't be used to
//! probe the server's configuration.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};

/// Why a verifier could not produce a verdict.
///
/// Callers of the session manager never see these — they exist so verifier
/// implementations can report precisely and the manager can log before
/// collapsing to `AuthenticationFailed`.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The stored hash could not be parsed.
    #[error("stored credential hash is malformed")]
    MalformedHash,

    /// The verification work could not be carried out at all.
    #[error("credential verification unavailable")]
    Unavailable,
}

/// Verifies a client-presented credential against a stored hash.
///
/// `Send + Sync + 'static` because the verifier is shared across request
/// tasks for the life of the server. The returned future must be `Send`
/// for the same reason.
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Returns `Ok(true)` only when `candidate` verifies against
    /// `stored_hash`.
    ///
    /// # Errors
    /// Implementations report [`CredentialError`] when no verdict could be
    /// produced; the session manager treats that identically to
    /// `Ok(false)`.
    fn verify(
        &self,
        stored_hash: &str,
        candidate: &str,
    ) -> impl std::future::Future<Output = Result<bool, CredentialError>> + Send;
}

/// [`CredentialVerifier`] backed by Argon2id in PHC string format.
///
/// Verification is memory-hard by design (that is the point of Argon2), so
/// it runs on the blocking pool rather than stalling the async workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    async fn verify(&self, stored_hash: &str, candidate: &str) -> Result<bool, CredentialError> {
        let stored_hash = stored_hash.to_owned();
        let candidate = candidate.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&stored_hash).map_err(|_| CredentialError::MalformedHash)?;
            match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(_) => Err(CredentialError::MalformedHash),
            }
        })
        .await
        .map_err(|_| CredentialError::Unavailable)?
    }
}
