//! Wire-level building blocks for Pollcast.
//!
//! This crate defines the two things the session core and a transport layer
//! must agree on byte-for-byte:
//!
//! 1. **Identity** — the [`SessionId`] a client echoes back on every call.
//! 2. **The long-poll payload** — the chunked framing ([`encode_chunks`] /
//!    [`decode_chunks`]) used to deliver every queued message in one
//!    round trip.
//!
//! Everything else (HTTP routing, header names, application payloads) lives
//! above this crate and is free to change without breaking clients.

mod chunk;
mod error;
mod types;

pub use chunk::{ChunkPayload, decode_chunks, encode_chunks};
pub use error::ProtocolError;
pub use types::SessionId;
