use crate::metrics::Metrics;
use crate::models::{ApiToken, Channel, GameResult, QueryInput, Severity};
use crate::services::api::{CheatSlipsClient, RequestError};
use crate::services::disclosure::ResultDisclosure;
use crate::services::notifications::NotificationCenter;
use crate::state::StateManager;
use std::sync::Arc;
use std::time::Instant;

/// Fetches the cheat files for one game build
///
/// Any previously displayed result is cleared before the request goes out, so a
/// stale result never sits next to an in-flight query.
#[derive(Clone)]
pub struct CheatCatalogQuery {
    client: Arc<CheatSlipsClient>,
    disclosure: ResultDisclosure,
    notifications: NotificationCenter,
    state: StateManager,
    metrics: Arc<Metrics>,
}

impl CheatCatalogQuery {
    pub fn new(
        client: Arc<CheatSlipsClient>,
        disclosure: ResultDisclosure,
        notifications: NotificationCenter,
        state: StateManager,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            client,
            disclosure,
            notifications,
            state,
            metrics,
        }
    }

    /// Preconditions are checked in order: token, titleId, buildId.
    pub async fn fetch_cheats(
        &self,
        token: Option<ApiToken>,
        query: &QueryInput,
    ) -> Result<GameResult, RequestError> {
        let Some(token) = token else {
            return Err(self.reject("Please get an API token first"));
        };
        let title_id = query.title_id.trim();
        if title_id.is_empty() {
            return Err(self.reject("Please enter a TitleId"));
        }
        let build_id = query.build_id.trim();
        if build_id.is_empty() {
            return Err(self.reject("Please enter a BuildID"));
        }

        let _busy = self.state.begin_request(Channel::Query);
        self.notifications.clear(Channel::Query);
        self.disclosure.replace_result(None);

        tracing::info!("Querying cheats for {}/{}", title_id, build_id);
        let started = Instant::now();
        let outcome = self
            .client
            .fetch_game(&token, &QueryInput::new(title_id, build_id))
            .await;
        self.metrics.record_request_time(started.elapsed());

        match outcome {
            Ok(result) => {
                self.metrics.record_query(true);
                let name = result.display_name(title_id).to_string();
                let found = result.cheats.len();
                tracing::info!(
                    "Received {} cheat files for {} (server count {})",
                    found,
                    name,
                    result.count
                );

                self.disclosure.replace_result(Some(result.clone()));

                if found > 0 {
                    self.notifications.post(
                        Channel::Query,
                        Severity::Success,
                        format!("Fetched {} cheat files for \"{}\"", found, name),
                    );
                } else {
                    self.notifications.post(
                        Channel::Query,
                        Severity::Info,
                        format!("No cheats found for \"{}\" (BuildID: {})", name, build_id),
                    );
                }
                Ok(result)
            }
            Err(err) => {
                tracing::warn!("Cheat query failed: {}", err);
                self.metrics.record_query(false);
                self.notifications.post(
                    Channel::Query,
                    Severity::Error,
                    err.user_message(
                        "Failed to get cheats",
                        "Network error while requesting cheats",
                    ),
                );
                Err(err)
            }
        }
    }

    fn reject(&self, text: &str) -> RequestError {
        tracing::debug!("Cheat query rejected: {}", text);
        self.metrics.record_validation_rejection();
        self.notifications.post(Channel::Query, Severity::Error, text);
        RequestError::Validation(text.to_string())
    }
}
