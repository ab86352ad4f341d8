use crate::metrics::Metrics;
use crate::models::{ApiToken, Channel, Credentials, Severity};
use crate::services::api::{CheatSlipsClient, RequestError};
use crate::services::notifications::NotificationCenter;
use crate::state::StateManager;
use std::sync::Arc;
use std::time::Instant;

/// Exchanges credentials for a bearer token and owns the current token
///
/// Each call ends in exactly one token replace-or-clear. Overlapping calls are
/// not cancelled; whichever response arrives last decides the final token.
#[derive(Clone)]
pub struct AuthSession {
    client: Arc<CheatSlipsClient>,
    state: StateManager,
    notifications: NotificationCenter,
    metrics: Arc<Metrics>,
}

impl AuthSession {
    pub fn new(
        client: Arc<CheatSlipsClient>,
        state: StateManager,
        notifications: NotificationCenter,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            client,
            state,
            notifications,
            metrics,
        }
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<ApiToken, RequestError> {
        if !credentials.is_complete() {
            tracing::debug!("Token request rejected: email or password missing");
            self.metrics.record_validation_rejection();
            let err = RequestError::Validation("Please enter your email and password".to_string());
            self.notifications.post(Channel::Auth, Severity::Error, err.to_string());
            return Err(err);
        }

        let _busy = self.state.begin_request(Channel::Auth);
        self.notifications.clear(Channel::Auth);

        tracing::info!("Requesting API token for {}", credentials.email.trim());
        let started = Instant::now();
        let outcome = self.client.request_token(credentials).await;
        self.metrics.record_request_time(started.elapsed());

        match outcome {
            Ok(token) => {
                tracing::info!(
                    "Token acquired ({}), expires {}",
                    token.redacted(),
                    token.expiration
                );
                self.metrics.record_auth(true);
                self.state.set_token(token.clone());
                self.notifications.post(
                    Channel::Auth,
                    Severity::Success,
                    format!(
                        "Token acquired! Valid until: {}",
                        token.expiration_display()
                    ),
                );
                Ok(token)
            }
            Err(err) => {
                tracing::warn!("Token request failed: {}", err);
                self.metrics.record_auth(false);
                self.state.clear_token();
                self.notifications.post(
                    Channel::Auth,
                    Severity::Error,
                    err.user_message(
                        "Failed to get token",
                        "Network error while requesting token",
                    ),
                );
                Err(err)
            }
        }
    }

    pub fn token(&self) -> Option<ApiToken> {
        self.state.token()
    }
}
