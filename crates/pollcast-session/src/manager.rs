//! The session manager: authenticates credentials and owns all live
//! sessions.
//!
//! The manager is the only component multiple request tasks mutate
//! concurrently, and the only thing they mutate is the id→session map
//! (insert on create, remove on teardown). One mutex around the map keeps
//! removal atomic with respect to lookups; every other mutable field lives
//! inside the session that owns it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use pollcast_protocol::SessionId;

use crate::{CredentialVerifier, Session, SessionError};

type SessionMap = Mutex<HashMap<SessionId, Arc<Session>>>;

/// Owns the set of live sessions, keyed by [`SessionId`].
///
/// Ids strictly increase and are never reused, even after teardown — a
/// stale client can't be routed to an unrelated newer session that happens
/// to land on a recycled id.
pub struct SessionManager<V> {
    sessions: Arc<SessionMap>,
    next_id: AtomicU64,
    /// The single stored credential hash every `authenticate` checks
    /// against (PHC string for the Argon2 verifier).
    stored_hash: String,
    verifier: V,
}

impl<V: CredentialVerifier> SessionManager<V> {
    /// Creates a manager with the stored credential hash and a verifier.
    pub fn new(stored_hash: impl Into<String>, verifier: V) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            stored_hash: stored_hash.into(),
            verifier,
        }
    }

    /// Verifies `credential` against the stored hash and mints a session.
    ///
    /// # Errors
    /// Returns [`SessionError::AuthenticationFailed`] when the verifier
    /// says no — or could not say anything at all. The two cases are
    /// indistinguishable to the caller by design.
    pub async fn authenticate(
        &self,
        credential: &str,
        lifetime: Duration,
    ) -> Result<Arc<Session>, SessionError> {
        match self.verifier.verify(&self.stored_hash, credential).await {
            Ok(true) => Ok(self.start_session(lifetime)),
            Ok(false) => {
                tracing::warn!("authentication rejected");
                Err(SessionError::AuthenticationFailed)
            }
            Err(error) => {
                // Log the real cause for the operator; the caller sees the
                // same opaque failure as a wrong secret.
                tracing::warn!(%error, "credential verifier failed");
                Err(SessionError::AuthenticationFailed)
            }
        }
    }

    /// Creates and registers a session with the given lifetime, without
    /// credential verification. `authenticate` calls this on success;
    /// exposed for callers that have verified identity by other means.
    pub fn start_session(&self, lifetime: Duration) -> Arc<Session> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::spawn(id, lifetime);

        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .insert(id, Arc::clone(&session));

        // The session removes itself from the map on teardown, whichever
        // path (natural expiry or explicit shutdown) gets there first. A
        // weak reference avoids keeping the map alive from inside its own
        // entries.
        //
        // Registered *after* the insert: the expiry task is already running,
        // and a session that tears down before the registration then hits
        // the run-immediately path of `on_teardown` and sweeps the fresh
        // entry on the spot. The other order would let the removal fire
        // against a map the entry never reached, leaving a dead session
        // stored forever.
        let map: Weak<SessionMap> = Arc::downgrade(&self.sessions);
        session.on_teardown(move |ses| {
            if let Some(map) = map.upgrade() {
                map.lock().expect("session map lock poisoned").remove(&ses.id());
            }
        });

        tracing::info!(%id, uid = %session.uid(), "session started");
        session
    }

    /// Looks up a session by id. No validation — callers must still
    /// `validate` the presented token.
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Explicitly shuts down a session by id.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] for an unknown (or already
    /// torn down, hence removed) id.
    pub fn shutdown(&self, id: SessionId) -> Result<(), SessionError> {
        let session = self.get(id).ok_or(SessionError::NotFound(id))?;
        session.teardown();
        Ok(())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
