//! Session types: one authenticated, time-bounded context per remote game
//! server.
//!
//! A session owns its credential ([`SecureToken`]), its outgoing message
//! queue ([`OutgoingQueue`]), and an expiry deadline enforced by a dedicated
//! timer task. It is a two-state machine:
//!
//! ```text
//!   Live ──(deadline passes with no bump)──→ TornDown   (expire + teardown
//!     │                                         ▲         subscribers fire)
//!     └──────────(explicit teardown)────────────┘        (teardown only)
//! ```
//!
//! `TornDown` is terminal and absorbing: validation always fails, pushes
//! always error, and the transition body runs exactly once no matter how
//! many callers race into it.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pollcast_protocol::SessionId;
use rand::Rng;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::queue::deadline_from;
use crate::{OutgoingQueue, SecureToken, SessionError};

/// The lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Deadline in the future, queue open, token valid.
    Live,
    /// Terminal: token cleared, queue closed, timer cancelled.
    TornDown,
}

/// A subscriber invoked during a lifecycle transition. Runs synchronously,
/// in registration order, at most once per session; long work belongs in a
/// task the subscriber spawns.
type Subscriber = Box<dyn FnOnce(&Session) + Send>;

/// Fields that change over the session's life, guarded by one lock.
///
/// The lock is never held across an await point, so a plain `std` mutex is
/// the right tool — `validate`, `bump`, and `push` must complete without
/// suspending.
struct Inner {
    token: SecureToken,
    deadline: Instant,
    state: SessionState,
    on_expire: Vec<Subscriber>,
    on_teardown: Vec<Subscriber>,
}

/// A live, time-bounded authenticated context.
///
/// Created via [`Session::spawn`] (normally through the session manager),
/// shared as `Arc<Session>`. The manager is the sole long-term owner;
/// collaborators hold only the `{id, token}` capability pair.
pub struct Session {
    id: SessionId,
    /// Public correlation id: random bytes plus a nanosecond timestamp.
    /// Safe to hand to collaborators — it grants no access.
    uid: String,
    lifetime: Duration,
    queue: OutgoingQueue,
    inner: Mutex<Inner>,
    /// Signals the expiry task that the deadline moved (or that it should
    /// re-check state and exit).
    extended: Notify,
    /// Single-shot teardown guard. Whoever wins the compare-and-swap runs
    /// the transition body; every other caller is a no-op.
    torn_down: AtomicBool,
}

impl Session {
    /// Creates a session and spawns its expiry timer task.
    ///
    /// Must be called from within a Tokio runtime. The timer task holds an
    /// `Arc` to the session and exits as soon as the session is torn down.
    pub fn spawn(id: SessionId, lifetime: Duration) -> Arc<Self> {
        let session = Arc::new(Self {
            id,
            uid: generate_uid(),
            lifetime,
            queue: OutgoingQueue::new(),
            inner: Mutex::new(Inner {
                token: SecureToken::generate(),
                deadline: deadline_from(Instant::now(), lifetime),
                state: SessionState::Live,
                on_expire: Vec::new(),
                on_teardown: Vec::new(),
            }),
            extended: Notify::new(),
            torn_down: AtomicBool::new(false),
        });

        tokio::spawn(Arc::clone(&session).expiry_loop());

        tracing::debug!(id = %id, lifetime_secs = lifetime.as_secs_f64(), "session spawned");
        session
    }

    /// The numeric session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The public correlation id exposed to collaborators.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The configured lifetime used for the initial deadline and every bump.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Whether the session is still live.
    pub fn is_live(&self) -> bool {
        self.state() == SessionState::Live
    }

    /// The token's external form, for handing to the client at issuance.
    /// Empty once the session is torn down.
    pub fn external_token(&self) -> String {
        let inner = self.lock();
        if inner.token.is_cleared() {
            String::new()
        } else {
            inner.token.external_form().to_owned()
        }
    }

    /// The current expiry deadline, or `None` once torn down.
    pub fn deadline(&self) -> Option<Instant> {
        let inner = self.lock();
        match inner.state {
            SessionState::Live => Some(inner.deadline),
            SessionState::TornDown => None,
        }
    }

    /// Validates a client-presented token against this session.
    ///
    /// Returns false if the session is torn down or already past its
    /// deadline at call time — the deadline verdict is computed *before*
    /// any bump. The constant-time token comparison executes on every call,
    /// including against expired sessions, so expiry state can't be inferred
    /// from response timing.
    ///
    /// On success with `bump = true` the deadline is extended by the
    /// configured lifetime.
    pub fn validate(&self, candidate: &str, bump: bool) -> bool {
        let now = Instant::now();
        let mut extended = false;
        let matched;

        {
            let mut inner = self.lock();
            let live = inner.state == SessionState::Live && now < inner.deadline;
            matched = inner.token.matches(candidate);

            if !live {
                return false;
            }
            if matched && bump {
                inner.deadline = deadline_from(now, self.lifetime);
                extended = true;
            }
        }

        if extended {
            self.extended.notify_one();
        }
        matched
    }

    /// Extends the deadline by the configured lifetime and re-arms the
    /// expiry timer. Used by explicit keep-alive calls.
    ///
    /// # Errors
    /// Returns [`SessionError::SessionClosed`] once torn down.
    pub fn bump(&self) -> Result<Instant, SessionError> {
        let deadline = {
            let mut inner = self.lock();
            if inner.state == SessionState::TornDown {
                return Err(SessionError::SessionClosed);
            }
            inner.deadline = deadline_from(Instant::now(), self.lifetime);
            inner.deadline
        };
        self.extended.notify_one();
        Ok(deadline)
    }

    /// Registers a subscriber that fires on natural expiry only, before the
    /// teardown subscribers. Dropped silently if the session is already
    /// torn down (the expire phase can never happen again).
    pub fn on_expire(&self, subscriber: impl FnOnce(&Session) + Send + 'static) {
        let mut inner = self.lock();
        if inner.state == SessionState::Live {
            inner.on_expire.push(Box::new(subscriber));
        }
    }

    /// Registers a subscriber that fires on every teardown path, last.
    ///
    /// If the session is already torn down the subscriber is invoked
    /// immediately — at-most-once still holds, and owners relying on
    /// teardown for cleanup never leak an entry.
    pub fn on_teardown(&self, subscriber: impl FnOnce(&Session) + Send + 'static) {
        let run_now = {
            let mut inner = self.lock();
            if inner.state == SessionState::Live {
                inner.on_teardown.push(Box::new(subscriber));
                None
            } else {
                Some(subscriber)
            }
        };
        if let Some(subscriber) = run_now {
            subscriber(self);
        }
    }

    /// Appends a message to the session's outgoing queue.
    ///
    /// # Errors
    /// Returns [`SessionError::SessionClosed`] once torn down.
    pub fn push(&self, message: impl Into<Vec<u8>>) -> Result<(), SessionError> {
        Ok(self.queue.push(message)?)
    }

    /// Long-poll drain of the outgoing queue: waits up to `timeout` for the
    /// first message, then sweeps everything buffered, in push order.
    /// Returns empty on timeout or once torn down.
    pub async fn drain(&self, timeout: Duration) -> Vec<Vec<u8>> {
        self.queue.drain(timeout).await
    }

    /// Explicit shutdown: clears the token, closes the queue, cancels the
    /// expiry timer, then runs teardown subscribers in registration order.
    ///
    /// Idempotent in effect — only the first caller (racing against natural
    /// expiry too) runs the transition body; repeats are silent no-ops.
    pub fn teardown(&self) {
        if self.begin_teardown() {
            tracing::info!(id = %self.id, uid = %self.uid, "session torn down");
            self.finish_teardown();
        }
    }

    /// Claims the single teardown slot. True for exactly one caller.
    fn begin_teardown(&self) -> bool {
        self.torn_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// The teardown body. Must only run after winning `begin_teardown`.
    fn finish_teardown(&self) {
        let subscribers = {
            let mut inner = self.lock();
            inner.token.clear();
            inner.state = SessionState::TornDown;
            inner.on_expire.clear();
            mem::take(&mut inner.on_teardown)
        };

        self.queue.close();
        // Wake the expiry task so it observes the terminal state and exits.
        self.extended.notify_one();

        for subscriber in subscribers {
            subscriber(self);
        }
    }

    /// The per-session timer task: waits for the current deadline, re-arms
    /// whenever the deadline is extended, and drives the natural-expiry
    /// transition when the wait runs out.
    async fn expiry_loop(self: Arc<Self>) {
        loop {
            let deadline = match self.deadline() {
                Some(deadline) => deadline,
                // Torn down explicitly — nothing left to time.
                None => return,
            };

            tokio::select! {
                _ = self.extended.notified() => continue,
                _ = time::sleep_until(deadline) => {}
            }

            // The deadline may have moved between our read and the wakeup;
            // only expire if it is genuinely in the past right now.
            match self.deadline() {
                Some(current) if Instant::now() < current => continue,
                Some(_) => break,
                None => return,
            }
        }

        if self.begin_teardown() {
            tracing::info!(id = %self.id, uid = %self.uid, "session expired");

            let expire_subscribers = {
                let mut inner = self.lock();
                mem::take(&mut inner.on_expire)
            };
            for subscriber in expire_subscribers {
                subscriber(&self);
            }

            self.finish_teardown();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session state lock poisoned")
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("uid", &self.uid)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Builds the public correlation id: 8 random bytes plus a nanosecond
/// timestamp, hex-encoded. Collisions are negligible and the id grants no
/// access, so this needs uniqueness, not secrecy.
fn generate_uid() -> String {
    let noise: [u8; 8] = rand::rng().random();
    let hex: String = noise.iter().map(|b| format!("{b:02x}")).collect();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{hex}-{nanos:x}")
}
