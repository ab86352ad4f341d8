// Shared application state and its change feed
//
// The rendering shell, the services, and the timer tasks all hold clones of one
// StateManager; the shell learns about changes from StateChange events.

use crate::models::{ApiToken, AppState, Channel, GameResult, Notification, Severity};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// What changed in one [`StateManager::update`] call
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A token was stored, replaced, or cleared
    TokenChanged { present: bool },

    /// The auth request busy flag flipped
    AuthBusyChanged { busy: bool },

    /// The query request busy flag flipped
    QueryBusyChanged { busy: bool },

    /// A notification became visible on a channel
    NotificationPosted {
        channel: Channel,
        severity: Severity,
        text: String,
    },

    /// A channel's notification was removed
    NotificationCleared { channel: Channel },

    /// The active game result was replaced or cleared
    GameResultChanged {
        name: Option<String>,
        cheats: usize,
    },

    /// Expanded or copied markers changed
    DisclosureChanged { expanded: usize, copied: usize },
}

/// Single owner of [`AppState`]
///
/// Every mutation goes through [`update`](Self::update), which diffs the state
/// before and after and broadcasts one [`StateChange`] per difference. All
/// writes for one action happen under one lock, so observers never see a
/// result without its matching (reset) disclosure state.
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    events: broadcast::Sender<StateChange>,
}

/// Events buffered per subscriber before it starts lagging
const EVENT_BUFFER: usize = 64;

impl StateManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            events,
        }
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    /// Run `f` under the read lock
    ///
    /// ```ignore
    /// let busy = state.read(|s| s.is_querying());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Apply `update_fn` under the write lock and broadcast what changed
    ///
    /// Returns the emitted events; an update that changes nothing emits none.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.clone();
        update_fn(&mut guard);

        let changes = Self::detect_changes(&before, &guard);
        for change in &changes {
            // No receivers is fine
            let _ = self.events.send(change.clone());
        }
        changes
    }

    /// Receiver for every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.token != new.token {
            changes.push(StateChange::TokenChanged {
                present: new.token.is_some(),
            });
        }

        if old.is_authenticating() != new.is_authenticating() {
            changes.push(StateChange::AuthBusyChanged {
                busy: new.is_authenticating(),
            });
        }

        if old.is_querying() != new.is_querying() {
            changes.push(StateChange::QueryBusyChanged {
                busy: new.is_querying(),
            });
        }

        for channel in [Channel::Auth, Channel::Query] {
            let before = old.notification(channel);
            let after = new.notification(channel);
            if before == after {
                continue;
            }
            match after {
                Some(notification) => changes.push(StateChange::NotificationPosted {
                    channel,
                    severity: notification.severity,
                    text: notification.text.clone(),
                }),
                None => changes.push(StateChange::NotificationCleared { channel }),
            }
        }

        let result_replaced = old.disclosure.generation() != new.disclosure.generation()
            || old.game_result != new.game_result;
        if result_replaced {
            changes.push(StateChange::GameResultChanged {
                name: new.game_result.as_ref().map(|r| r.name.clone()),
                cheats: new.game_result.as_ref().map_or(0, |r| r.cheats.len()),
            });
        }

        if old.disclosure.expanded() != new.disclosure.expanded()
            || old.disclosure.copied() != new.disclosure.copied()
        {
            changes.push(StateChange::DisclosureChanged {
                expanded: new.disclosure.expanded().len(),
                copied: new.disclosure.copied().len(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Store a freshly issued token, replacing any previous one
    pub fn set_token(&self, token: ApiToken) -> Vec<StateChange> {
        self.update(|state| state.token = Some(token))
    }

    /// Drop the current token
    pub fn clear_token(&self) -> Vec<StateChange> {
        self.update(|state| state.token = None)
    }

    /// Current token, if any
    pub fn token(&self) -> Option<ApiToken> {
        self.read(|state| state.token.clone())
    }

    /// Replace (or clear) the active game result, resetting disclosure state
    pub fn replace_game_result(&self, result: Option<GameResult>) -> Vec<StateChange> {
        self.update(|state| state.replace_game_result(result))
    }

    /// Show a notification on its channel, superseding the previous one
    pub fn set_notification(&self, notification: Notification) -> Vec<StateChange> {
        self.update(|state| {
            let channel = notification.channel;
            *state.notification_slot(channel) = Some(notification);
        })
    }

    /// Clear a channel's notification
    ///
    /// With `only_seq`, the slot is cleared only if it still holds that
    /// notification.
    pub fn clear_notification(&self, channel: Channel, only_seq: Option<u64>) -> Vec<StateChange> {
        self.update(|state| {
            let slot = state.notification_slot(channel);
            let matches = match (&*slot, only_seq) {
                (Some(current), Some(seq)) => current.seq == seq,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if matches {
                *slot = None;
            }
        })
    }

    /// Flip the expanded marker for a cheat entry
    pub fn toggle_expand(&self, id: &str) -> Vec<StateChange> {
        self.update(|state| {
            state.disclosure.toggle_expand(id);
        })
    }

    /// Mark a cheat entry as just copied, returning the disclosure generation
    /// the marker belongs to
    pub fn mark_copied(&self, id: &str) -> u64 {
        let mut generation = 0;
        self.update(|state| {
            state.disclosure.mark_copied(id);
            generation = state.disclosure.generation();
        });
        generation
    }

    /// Mark `id` as copied only if the disclosure state is still at
    /// `generation`. Returns whether the marker was set.
    pub fn mark_copied_at(&self, id: &str, generation: u64) -> bool {
        let mut marked = false;
        self.update(|state| {
            if state.disclosure.generation() == generation {
                state.disclosure.mark_copied(id);
                marked = true;
            }
        });
        marked
    }

    /// Remove a copied marker unless the disclosure state was reset since
    /// `generation`
    pub fn clear_copied(&self, id: &str, generation: u64) -> Vec<StateChange> {
        self.update(|state| {
            state.disclosure.clear_copied(id, generation);
        })
    }

    /// Mark a request as in flight on `channel`
    ///
    /// The returned guard clears the mark when dropped, whichever way the
    /// request ends.
    pub fn begin_request(&self, channel: Channel) -> InFlightGuard {
        self.update(|state| match channel {
            Channel::Auth => state.auth_in_flight += 1,
            Channel::Query => state.query_in_flight += 1,
        });
        InFlightGuard {
            state: self.clone(),
            channel,
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share one state and one event channel
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }
    }
}

/// Busy marker for one in-flight request. Dropping it ends the request.
#[must_use = "the request is marked finished as soon as the guard is dropped"]
pub struct InFlightGuard {
    state: StateManager,
    channel: Channel,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let channel = self.channel;
        self.state.update(|state| match channel {
            Channel::Auth => state.auth_in_flight = state.auth_in_flight.saturating_sub(1),
            Channel::Query => state.query_in_flight = state.query_in_flight.saturating_sub(1),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(name: &str) -> GameResult {
        GameResult {
            name: name.to_string(),
            titleid: "0100A3D008C5C000".to_string(),
            slug: "game-x".to_string(),
            banner: None,
            image: None,
            count: 1,
            cheats: vec![crate::models::CheatFile {
                id: "1".to_string(),
                credits: "someone".to_string(),
                buildid: "421C5411B487EB4D".to_string(),
                description: None,
                titles: vec!["[Infinite HP]".to_string()],
                content: "code".to_string(),
            }],
        }
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.has_token());
        assert!(state.game_result.is_none());
        assert!(!state.is_authenticating());
    }

    #[test]
    fn test_token_change_detection() {
        let manager = StateManager::new();

        let changes = manager.set_token(ApiToken::new("T1", "2030-01-01T00:00:00Z"));
        assert_eq!(changes, vec![StateChange::TokenChanged { present: true }]);

        // Same token again is not a change
        let changes = manager.set_token(ApiToken::new("T1", "2030-01-01T00:00:00Z"));
        assert!(changes.is_empty());

        let changes = manager.clear_token();
        assert_eq!(changes, vec![StateChange::TokenChanged { present: false }]);
    }

    #[test]
    fn test_replace_result_emits_reset() {
        let manager = StateManager::new();
        manager.replace_game_result(Some(sample_result("Game X")));
        manager.toggle_expand("1");

        let changes = manager.replace_game_result(Some(sample_result("Game X")));

        assert!(changes.contains(&StateChange::GameResultChanged {
            name: Some("Game X".to_string()),
            cheats: 1,
        }));
        assert!(changes.contains(&StateChange::DisclosureChanged {
            expanded: 0,
            copied: 0,
        }));
        assert!(manager.read(|s| s.disclosure.is_empty()));
    }

    #[test]
    fn test_notification_post_and_clear() {
        let manager = StateManager::new();
        let note = Notification::new(Channel::Auth, Severity::Error, "nope").with_seq(1);

        let changes = manager.set_notification(note);
        assert!(matches!(
            changes[0],
            StateChange::NotificationPosted {
                channel: Channel::Auth,
                severity: Severity::Error,
                ..
            }
        ));

        let changes = manager.clear_notification(Channel::Auth, None);
        assert_eq!(
            changes,
            vec![StateChange::NotificationCleared {
                channel: Channel::Auth
            }]
        );
    }

    #[test]
    fn test_reposting_identical_text_is_a_change() {
        let manager = StateManager::new();
        manager.set_notification(Notification::new(Channel::Query, Severity::Info, "x").with_seq(1));
        let changes =
            manager.set_notification(Notification::new(Channel::Query, Severity::Info, "x").with_seq(2));

        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_clear_notification_with_stale_seq_is_noop() {
        let manager = StateManager::new();
        manager.set_notification(Notification::new(Channel::Query, Severity::Info, "new").with_seq(2));

        let changes = manager.clear_notification(Channel::Query, Some(1));
        assert!(changes.is_empty());
        assert!(manager.read(|s| s.query_notification.is_some()));
    }

    #[test]
    fn test_copied_marker_generation() {
        let manager = StateManager::new();
        let generation = manager.mark_copied("1");
        assert!(manager.read(|s| s.disclosure.is_copied("1")));

        manager.clear_copied("1", generation);
        assert!(!manager.read(|s| s.disclosure.is_copied("1")));
    }

    #[test]
    fn test_in_flight_guard_counts_overlapping_requests() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        let first = manager.begin_request(Channel::Auth);
        let second = manager.begin_request(Channel::Auth);
        assert!(manager.read(|s| s.is_authenticating()));
        assert!(!manager.read(|s| s.is_querying()));

        drop(first);
        assert!(manager.read(|s| s.is_authenticating()));

        drop(second);
        assert!(!manager.read(|s| s.is_authenticating()));

        assert_eq!(rx.try_recv().unwrap(), StateChange::AuthBusyChanged { busy: true });
        assert_eq!(rx.try_recv().unwrap(), StateChange::AuthBusyChanged { busy: false });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.set_token(ApiToken::new("T1", ""));

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_token(ApiToken::new("T1", ""));

        assert!(manager2.snapshot().has_token());
    }
}
