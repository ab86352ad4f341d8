// App Controller - wires user actions to the session, catalog, and view state
//
// The controller owns every piece of mutable state through a single StateManager
// and exposes one method per user action. The rendering shell calls these and
// listens to StateChange events; it never touches AppState directly.

use crate::metrics::Metrics;
use crate::models::{
    ApiToken, AppState, Credentials, DEFAULT_API_BASE_URL, GameResult, QueryInput, UserConfig,
};
use crate::services::{
    AuthSession, CheatCatalogQuery, CheatSlipsClient, Clipboard, ClipboardError,
    NotificationCenter, RequestError, ResultDisclosure,
};
use crate::state::{StateChange, StateManager};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Page-level controller
///
/// - `authenticate` → [`AuthSession`] → token stored in state
/// - `fetch_cheats` → [`CheatCatalogQuery`] with the stored token → result stored
/// - `toggle_expand` / `copy` → [`ResultDisclosure`]
///
/// Auth and query have independent busy flags; neither blocks the other.
///
/// # Example
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let controller = AppController::new(
///     &UserConfig::default(),
///     Arc::new(SystemClipboard::new()),
///     runtime.handle().clone(),
/// )?;
/// runtime.block_on(controller.authenticate(Credentials::new("a@b.com", "pw")))?;
/// ```
pub struct AppController {
    state: StateManager,
    auth: AuthSession,
    catalog: CheatCatalogQuery,
    disclosure: ResultDisclosure,
    notifications: NotificationCenter,
    clipboard: Arc<dyn Clipboard>,
    metrics: Arc<Metrics>,
}

impl AppController {
    /// Create a controller talking to the CheatSlips API
    ///
    /// # Arguments
    /// * `config` - Timer durations
    /// * `clipboard` - Clipboard used by [`copy`](Self::copy)
    /// * `tokio_handle` - Runtime the auto-clear timers are spawned on
    pub fn new(
        config: &UserConfig,
        clipboard: Arc<dyn Clipboard>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_API_BASE_URL, clipboard, tokio_handle)
    }

    /// Like [`new`](Self::new), against another API root (a local mock server)
    pub fn with_base_url(
        config: &UserConfig,
        base_url: &str,
        clipboard: Arc<dyn Clipboard>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let timings = config.timings();

        let client = Arc::new(CheatSlipsClient::new(base_url)?);
        let state = StateManager::new();
        let metrics = Arc::new(Metrics::new());

        let notifications =
            NotificationCenter::new(state.clone(), tokio_handle.clone(), timings.notification);
        let disclosure = ResultDisclosure::new(state.clone(), tokio_handle, timings.copy_feedback);

        let auth = AuthSession::new(
            Arc::clone(&client),
            state.clone(),
            notifications.clone(),
            Arc::clone(&metrics),
        );
        let catalog = CheatCatalogQuery::new(
            client,
            disclosure.clone(),
            notifications.clone(),
            state.clone(),
            Arc::clone(&metrics),
        );

        tracing::info!("Controller initialized for {}", base_url);

        Ok(Self {
            state,
            auth,
            catalog,
            disclosure,
            notifications,
            clipboard,
            metrics,
        })
    }

    /// Exchange credentials for a token
    ///
    /// The previous token stays visible until this call resolves.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<ApiToken, RequestError> {
        self.auth.authenticate(&credentials).await
    }

    /// Fetch cheats for `query` using the token held right now
    pub async fn fetch_cheats(&self, query: QueryInput) -> Result<GameResult, RequestError> {
        let token = self.auth.token();
        self.catalog.fetch_cheats(token, &query).await
    }

    pub fn toggle_expand(&self, id: &str) -> bool {
        self.disclosure.toggle_expand(id)
    }

    /// Put `content` on the clipboard and flash the copied marker for `id`
    ///
    /// Failures are logged and otherwise ignored: no notification, no marker.
    /// If a query replaces the result while the write is running, the text is
    /// still copied but no marker is set on the new result.
    /// Returns whether the copy happened.
    pub async fn copy(&self, content: String, id: &str) -> bool {
        let generation = self.disclosure.generation();
        let clipboard = Arc::clone(&self.clipboard);
        let outcome = tokio::task::spawn_blocking(move || clipboard.set_text(&content))
            .await
            .unwrap_or_else(|e| Err(ClipboardError::Task(e.to_string())));

        match outcome {
            Ok(()) => {
                tracing::debug!("Copied cheat {} to clipboard", id);
                self.metrics.record_copy(true);
                if !self.disclosure.mark_copied_at(id, generation) {
                    tracing::debug!("Result replaced while copying {}, marker skipped", id);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Copy failed for cheat {}: {}", id, e);
                self.metrics.record_copy(false);
                false
            }
        }
    }

    /// Copy the content of cheat `id` from the active result
    pub async fn copy_cheat(&self, id: &str) -> bool {
        let content = self.state.read(|s| {
            s.game_result
                .as_ref()
                .and_then(|r| r.find_cheat(id))
                .map(|c| c.content.clone())
        });

        match content {
            Some(content) => self.copy(content, id).await,
            None => {
                tracing::debug!("No cheat {} in the active result", id);
                false
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
