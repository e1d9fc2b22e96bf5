//! The application payload carried inside one chunk.
//!
//! A chunk body is `command`, one NUL separator, then arbitrary content
//! bytes. Only the *first* NUL separates — content is free to contain NUL
//! bytes of its own, which matters because content is often a nested binary
//! blob.

use crate::PollcastError;

/// One command-plus-content event, the unit the outgoing queue carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Routing key for the receiving side. Non-empty, NUL-free.
    pub command: String,
    /// Opaque payload bytes. May contain NULs.
    pub content: Vec<u8>,
}

impl EventRecord {
    /// Builds an event record.
    pub fn new(command: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            command: command.into(),
            content: content.into(),
        }
    }

    /// Encodes to `command + NUL + content`.
    ///
    /// # Errors
    /// [`PollcastError::InvalidEvent`] if the command is empty or contains
    /// a NUL byte — either would make the encoding ambiguous on decode.
    pub fn encode(&self) -> Result<Vec<u8>, PollcastError> {
        if self.command.is_empty() {
            return Err(PollcastError::InvalidEvent("command is empty"));
        }
        if self.command.bytes().any(|b| b == 0) {
            return Err(PollcastError::InvalidEvent("command contains NUL"));
        }

        let mut out = Vec::with_capacity(self.command.len() + 1 + self.content.len());
        out.extend_from_slice(self.command.as_bytes());
        out.push(0);
        out.extend_from_slice(&self.content);
        Ok(out)
    }

    /// Decodes one chunk body, splitting at the first NUL.
    ///
    /// # Errors
    /// [`PollcastError::InvalidEvent`] when the separator is missing, the
    /// command half is empty, or the command is not valid UTF-8.
    pub fn decode(bytes: &[u8]) -> Result<Self, PollcastError> {
        let sep = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or(PollcastError::InvalidEvent("missing NUL separator"))?;
        if sep == 0 {
            return Err(PollcastError::InvalidEvent("command is empty"));
        }

        let command = std::str::from_utf8(&bytes[..sep])
            .map_err(|_| PollcastError::InvalidEvent("command is not UTF-8"))?
            .to_owned();
        let content = bytes[sep + 1..].to_vec();
        Ok(Self { command, content })
    }
}
