//! # Pollcast
//!
//! Long-poll session engine for remote game servers.
//!
//! A game server authenticates once with a shared credential and receives a
//! `{session id, token}` capability pair. Every later call presents the
//! pair; validating it keeps the session alive, and a session that goes
//! quiet past its lifetime is expired and torn down by the engine itself.
//! Server-to-client traffic rides a per-session queue drained by long-poll.
//!
//! This meta-crate re-exports the session core and the wire types, and adds
//! the pieces that sit between a transport and the core:
//!
//! - [`dispatch`] — turns raw `{id, token}` strings into
//!   [`Access`](dispatch::Access) without trusting either.
//! - [`EventRecord`] — the `command + NUL + content` payload format.
//! - [`PlayerList`] — session-aware presence bookkeeping.
//! - [`PollcastError`] — one error type over all sub-crates.

pub mod dispatch;
mod error;
mod event;
mod playerlist;

pub use error::PollcastError;
pub use event::EventRecord;
pub use playerlist::{Player, PlayerList};

pub use pollcast_protocol::{ChunkPayload, ProtocolError, SessionId, decode_chunks, encode_chunks};
pub use pollcast_session::{
    Argon2Verifier, CredentialError, CredentialVerifier, ENCODED_LEN, OutgoingQueue, QueueClosed,
    SecureToken, Session, SessionError, SessionManager, SessionState, TOKEN_LEN,
};
