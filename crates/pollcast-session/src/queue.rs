//! The per-session outgoing message queue with long-poll drain.
//!
//! Server-to-client delivery in Pollcast is pull-based: the client parks a
//! long-poll call and the server answers as soon as something is queued (or
//! the deadline passes). The queue therefore needs exactly three behaviors:
//!
//! - `push` never blocks — callers are request handlers on the hot path.
//! - `drain` blocks until the first message arrives, then sweeps everything
//!   already buffered so one round trip empties the backlog.
//! - `close` is terminal and releases any parked drainer.
//!
//! One long-poll consumer per queue at a time; the wakeup discipline uses
//! `Notify::notify_one`, which stores a permit when nobody is waiting, so a
//! push that lands between the drainer's state check and its await is never
//! lost.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::QueueClosed;

/// Stand-in deadline when a requested wait would overflow the clock; far
/// enough out to be "forever" for any real deployment.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// The point `dur` after `start`, clamped instead of panicking when the
/// addition overflows. A `Duration::MAX` long-poll window degrades to
/// "wait for a push or close", not a crash.
pub(crate) fn deadline_from(start: Instant, dur: Duration) -> Instant {
    start.checked_add(dur).unwrap_or_else(|| start + FAR_FUTURE)
}

#[derive(Default)]
struct QueueInner {
    items: VecDeque<Vec<u8>>,
    closed: bool,
}

/// An unbounded FIFO of pending messages for one session.
#[derive(Default)]
pub struct OutgoingQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
}

impl OutgoingQueue {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the tail. Non-blocking.
    ///
    /// # Errors
    /// Returns [`QueueClosed`] once [`close`](Self::close) has been called.
    pub fn push(&self, message: impl Into<Vec<u8>>) -> Result<(), QueueClosed> {
        {
            let mut inner = self.inner.lock().expect("queue lock poisoned");
            if inner.closed {
                return Err(QueueClosed);
            }
            inner.items.push_back(message.into());
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Waits up to `timeout` for at least one message, then returns every
    /// message currently buffered, in push order.
    ///
    /// An empty result means the deadline elapsed (or the queue was closed
    /// while waiting) — that is a normal long-poll outcome, not an error.
    pub async fn drain(&self, timeout: Duration) -> Vec<Vec<u8>> {
        let deadline = deadline_from(Instant::now(), timeout);

        loop {
            // Register interest *before* checking state: a push between the
            // check and the await then leaves a stored permit instead of a
            // lost wakeup.
            let notified = self.notify.notified();

            {
                let mut inner = self.inner.lock().expect("queue lock poisoned");
                if !inner.items.is_empty() {
                    return inner.items.drain(..).collect();
                }
                if inner.closed {
                    return Vec::new();
                }
            }

            if time::timeout_at(deadline, notified).await.is_err() {
                // Deadline elapsed. One final non-blocking sweep, in case a
                // push raced the timeout.
                let mut inner = self.inner.lock().expect("queue lock poisoned");
                return inner.items.drain(..).collect();
            }
        }
    }

    /// Closes the queue: rejects later pushes, releases a parked drainer.
    /// Idempotent.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().expect("queue lock poisoned");
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.notify.notify_one();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("queue lock poisoned").closed
    }

    /// Number of messages currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").items.len()
    }

    /// Whether no messages are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
