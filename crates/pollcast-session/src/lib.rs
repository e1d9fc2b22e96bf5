//! Session lifecycle engine for Pollcast.
//!
//! This crate owns the authenticated-session state machine: minting a
//! session with an unguessable token, validating presented credentials in
//! constant time, expiring sessions whose lifetime lapses without a bump,
//! and tearing everything down exactly once — whichever of expiry or
//! explicit shutdown gets there first.
//!
//! The pieces compose like this:
//!
//! - [`SecureToken`] — 64 random bytes, compared in constant time.
//! - [`OutgoingQueue`] — per-session FIFO the long-poll endpoint drains.
//! - [`Session`] — one live session: token, deadline, queue, and the
//!   background task that enforces expiry.
//! - [`SessionManager`] — authenticates credentials (via a pluggable
//!   [`CredentialVerifier`]) and owns the id→session map.
//!
//! Every session runs its own expiry task on the Tokio timer, so "expired"
//! is an event that fires, not a state a caller has to poll for.

mod error;
mod manager;
mod queue;
mod session;
mod token;
mod verify;

pub use error::{QueueClosed, SessionError};
pub use manager::SessionManager;
pub use queue::OutgoingQueue;
pub use session::{Session, SessionState};
pub use token::{ENCODED_LEN, SecureToken, TOKEN_LEN};
pub use verify::{Argon2Verifier, CredentialError, CredentialVerifier};
