//! In-memory registry of per-game controller state.
//!
//! The registry is the single source of truth. Each game's state sits behind
//! its own mutex so unrelated games never serialize each other; the outer
//! map lock is held only long enough to fetch or insert an entry. Every
//! operation takes an explicit `now` (the HTTP layer passes `Utc::now()`,
//! tests drive a virtual clock) and runs the lazy sweep before touching
//! state, so stale leases and expired handoffs are never observable.
//!
//! State is intentionally not persisted: a process restart forces every
//! coach to re-claim, which guarantees no stale claims survive a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::handoff::{self, HandoffResolution};
use crate::lease::{self, ClaimOutcome};
use crate::state::{ControllerState, PendingHandoff, Role};
use crate::types::{GameId, Timestamp};

/// One game's state plus bookkeeping for idle reaping.
#[derive(Debug)]
struct GameEntry {
    state: ControllerState,
    last_touched: Timestamp,
}

/// Shared, concurrently-accessed map of game id to controller state.
///
/// Cheap to share via `Arc`; all methods take `&self`. Reads return deep
/// copies, never references into the map.
#[derive(Debug)]
pub struct ControllerRegistry {
    config: ControllerConfig,
    games: Mutex<HashMap<GameId, Arc<Mutex<GameEntry>>>>,
}

impl ControllerRegistry {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            games: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current state for a game. Unseen games yield the empty state; this
    /// never errors. Self-healing: the sweep runs before the snapshot is
    /// taken.
    pub fn get(&self, game_id: &str, now: Timestamp) -> ControllerState {
        self.with_entry(game_id, now, |state, _| state.clone())
    }

    /// Claim a role, or open a handoff negotiation if it is held by someone
    /// else. Returns the outcome together with a post-operation snapshot.
    pub fn claim(
        &self,
        game_id: &str,
        role: Role,
        user_id: &str,
        display_name: &str,
        now: Timestamp,
    ) -> Result<(ClaimOutcome, ControllerState), ControllerError> {
        self.with_entry(game_id, now, |state, config| {
            let outcome = lease::claim(state, role, user_id, display_name, config, now)?;
            Ok((outcome, state.clone()))
        })
    }

    /// Release a held role.
    pub fn release(
        &self,
        game_id: &str,
        role: Role,
        user_id: &str,
        now: Timestamp,
    ) -> Result<ControllerState, ControllerError> {
        self.with_entry(game_id, now, |state, _| {
            lease::release(state, role, user_id)?;
            Ok(state.clone())
        })
    }

    /// Respond to the pending handoff as its current holder.
    ///
    /// Returns the resolution, the consumed handoff, and a post-operation
    /// snapshot.
    pub fn respond(
        &self,
        game_id: &str,
        user_id: &str,
        accept: bool,
        now: Timestamp,
    ) -> Result<(HandoffResolution, PendingHandoff, ControllerState), ControllerError> {
        self.with_entry(game_id, now, |state, _| {
            let (resolution, consumed) = handoff::respond(state, user_id, accept, now)?;
            Ok((resolution, consumed, state.clone()))
        })
    }

    /// Refresh the caller's heartbeats. Never errors; holding no role pings
    /// nothing.
    pub fn heartbeat(
        &self,
        game_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> (Vec<Role>, ControllerState) {
        self.with_entry(game_id, now, |state, _| {
            let pinged = lease::heartbeat(state, user_id, now);
            (pinged, state.clone())
        })
    }

    /// Drop a game's controller state entirely (the game ended).
    ///
    /// Returns whether an entry existed. Callers' next reads see the empty
    /// state.
    pub fn clear(&self, game_id: &str) -> bool {
        self.lock_games().remove(game_id).is_some()
    }

    /// Snapshot of every tracked game, after sweeping each. For monitoring
    /// and debugging.
    pub fn active_games(&self, now: Timestamp) -> Vec<(GameId, ControllerState)> {
        let entries: Vec<(GameId, Arc<Mutex<GameEntry>>)> = self
            .lock_games()
            .iter()
            .map(|(id, entry)| (id.clone(), Arc::clone(entry)))
            .collect();

        entries
            .into_iter()
            .map(|(id, entry)| {
                let mut entry = lock_entry(&entry);
                lease::sweep(&mut entry.state, &self.config, now);
                (id, entry.state.clone())
            })
            .collect()
    }

    /// Remove entries whose state is empty and which nobody has touched for
    /// `idle_for`. Returns how many were dropped.
    ///
    /// Correctness never depends on this; the lazy sweep already hides
    /// anything stale. Reaping only bounds the map's memory over many games.
    pub fn reap_idle(&self, idle_for: chrono::Duration, now: Timestamp) -> usize {
        let mut games = self.lock_games();
        let before = games.len();
        games.retain(|_, entry| {
            // An `Arc` clone outside the map means an operation fetched this
            // entry and has yet to run (clones are taken under the map lock,
            // which we hold). Dropping it now would orphan that operation's
            // write, so keep the entry and let a later pass reap it.
            if Arc::strong_count(entry) > 1 {
                return true;
            }
            let mut entry = lock_entry(entry);
            lease::sweep(&mut entry.state, &self.config, now);
            !(entry.state.is_empty() && now - entry.last_touched > idle_for)
        });
        before - games.len()
    }

    /// Run `f` on a game's state under its per-game lock, sweeping first.
    fn with_entry<R>(
        &self,
        game_id: &str,
        now: Timestamp,
        f: impl FnOnce(&mut ControllerState, &ControllerConfig) -> R,
    ) -> R {
        let entry = {
            let mut games = self.lock_games();
            match games.get(game_id) {
                Some(entry) => Arc::clone(entry),
                None => {
                    let entry = Arc::new(Mutex::new(GameEntry {
                        state: ControllerState::default(),
                        last_touched: now,
                    }));
                    games.insert(game_id.to_string(), Arc::clone(&entry));
                    entry
                }
            }
        };

        let mut entry = lock_entry(&entry);
        entry.last_touched = now;
        lease::sweep(&mut entry.state, &self.config, now);
        f(&mut entry.state, &self.config)
    }

    fn lock_games(&self) -> std::sync::MutexGuard<'_, HashMap<GameId, Arc<Mutex<GameEntry>>>> {
        // Poisoning means a panic while holding the lock, which is a bug,
        // not a recoverable condition.
        self.games.lock().expect("controller registry map poisoned")
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

fn lock_entry(entry: &Mutex<GameEntry>) -> std::sync::MutexGuard<'_, GameEntry> {
    entry.lock().expect("game entry lock poisoned")
}
