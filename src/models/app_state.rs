use crate::models::{ApiToken, Channel, DisclosureState, GameResult, Notification};

/// Single source of truth for everything the rendering shell displays.
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`StateManager`](crate::state::StateManager). Never mutate it directly; go
/// through [`update()`](crate::state::StateManager::update) so change events
/// are emitted.
///
/// Ownership rules:
/// - `token` is written only by [`AuthSession`](crate::services::AuthSession).
/// - `game_result` and `disclosure` change together. Replacing or clearing the
///   result always resets the disclosure state in the same update.
/// - The two notification slots are written only by
///   [`NotificationCenter`](crate::services::NotificationCenter).
#[derive(Clone, Debug, Default)]
pub struct AppState {
    // Session
    pub token: Option<ApiToken>,

    // Query results
    pub game_result: Option<GameResult>,
    pub disclosure: DisclosureState,

    // Notification channels
    pub auth_notification: Option<Notification>,
    pub query_notification: Option<Notification>,

    // In-flight request counters (> 0 means busy)
    pub auth_in_flight: usize,
    pub query_in_flight: usize,
}

impl AppState {
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_authenticating(&self) -> bool {
        self.auth_in_flight > 0
    }

    pub fn is_querying(&self) -> bool {
        self.query_in_flight > 0
    }

    pub fn notification(&self, channel: Channel) -> Option<&Notification> {
        match channel {
            Channel::Auth => self.auth_notification.as_ref(),
            Channel::Query => self.query_notification.as_ref(),
        }
    }

    pub fn notification_slot(&mut self, channel: Channel) -> &mut Option<Notification> {
        match channel {
            Channel::Auth => &mut self.auth_notification,
            Channel::Query => &mut self.query_notification,
        }
    }

    /// Replace (or clear) the active result and reset disclosure state with it.
    pub fn replace_game_result(&mut self, result: Option<GameResult>) {
        self.game_result = result;
        self.disclosure.reset();
    }
}
