//! Tracks which player is on which server session.
//!
//! Game servers report joins and leaves; the list answers "where is user N
//! right now". Sessions are identified by their public `uid` — the list
//! never sees numeric session ids or tokens, so it can be handed to
//! presence/lobby code without widening the trust boundary.
//!
//! The list stays consistent with the session lifecycle through
//! [`track`](PlayerList::track): when a tracked session tears down (expiry
//! or explicit shutdown), every player still recorded on it is swept out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use pollcast_session::Session;

/// One player as reported by a game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub user_id: u64,
    pub name: String,
}

#[derive(Default)]
struct Index {
    /// session uid → players currently on that session.
    by_session: HashMap<String, Vec<Player>>,
    /// user id → session uid, for O(1) "where is this player" lookups.
    by_user: HashMap<u64, String>,
}

/// A shared, session-aware player index.
#[derive(Default, Clone)]
pub struct PlayerList {
    index: Arc<Mutex<Index>>,
}

impl PlayerList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the session's teardown so its players are swept when
    /// the session ends. Call once per session, at creation time.
    pub fn track(&self, session: &Arc<Session>) {
        let index: Weak<Mutex<Index>> = Arc::downgrade(&self.index);
        session.on_teardown(move |ses| {
            if let Some(index) = index.upgrade() {
                let mut index = index.lock().expect("player index lock poisoned");
                if let Some(players) = index.by_session.remove(ses.uid()) {
                    for player in &players {
                        index.by_user.remove(&player.user_id);
                    }
                    tracing::debug!(
                        uid = %ses.uid(),
                        swept = players.len(),
                        "swept players of ended session"
                    );
                }
            }
        });
    }

    /// Records a player joining the given session. A player already listed
    /// elsewhere is moved — a user is on at most one server at a time.
    ///
    /// A join against a session that has already ended is dropped: its
    /// teardown sweep has run (or is running), so an entry recorded now
    /// would never be swept.
    pub fn join(&self, session: &Session, player: Player) {
        let mut index = self.index.lock().expect("player index lock poisoned");

        // Checked under the index lock: the teardown sweep takes this lock
        // too, and the session's state flips before the sweep runs. So
        // either the flip already happened (the join is dropped here) or
        // the sweep is still pending and will run after us, removing
        // whatever we insert.
        if !session.is_live() {
            tracing::debug!(uid = %session.uid(), "dropped join against ended session");
            return;
        }

        if let Some(previous) = index.by_user.remove(&player.user_id) {
            if let Some(players) = index.by_session.get_mut(&previous) {
                players.retain(|p| p.user_id != player.user_id);
            }
        }

        index
            .by_user
            .insert(player.user_id, session.uid().to_owned());
        index
            .by_session
            .entry(session.uid().to_owned())
            .or_default()
            .push(player);
    }

    /// Records a player leaving the given session. A leave for a player the
    /// list never saw is a no-op.
    pub fn leave(&self, session: &Session, user_id: u64) {
        let mut index = self.index.lock().expect("player index lock poisoned");

        // Only honor the leave if the player is actually on *this* session;
        // a stale report from a previous server must not evict the player
        // from their current one.
        if index.by_user.get(&user_id).map(String::as_str) != Some(session.uid()) {
            return;
        }

        index.by_user.remove(&user_id);
        if let Some(players) = index.by_session.get_mut(session.uid()) {
            players.retain(|p| p.user_id != user_id);
        }
    }

    /// The uid of the session the player is currently on, if any.
    pub fn server_of(&self, user_id: u64) -> Option<String> {
        self.index
            .lock()
            .expect("player index lock poisoned")
            .by_user
            .get(&user_id)
            .cloned()
    }

    /// Whether the player is currently on any session.
    pub fn is_active(&self, user_id: u64) -> bool {
        self.index
            .lock()
            .expect("player index lock poisoned")
            .by_user
            .contains_key(&user_id)
    }

    /// The players currently on the given session, in join order.
    pub fn players_on(&self, session: &Session) -> Vec<Player> {
        self.index
            .lock()
            .expect("player index lock poisoned")
            .by_session
            .get(session.uid())
            .cloned()
            .unwrap_or_default()
    }
}
