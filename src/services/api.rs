use crate::models::{ApiErrorBody, ApiToken, Credentials, GameResult, QueryInput};
use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Serialize;
use std::error::Error as _;
use thiserror::Error;
use url::Url;

/// Header carrying the bearer token on catalog requests.
pub const TOKEN_HEADER: &str = "X-API-TOKEN";

/// Appended to transport errors that look like the request never reached the server.
pub const NETWORK_HINT: &str = " This may be caused by network problems or the server's cross-origin policy. \
Check your connection and confirm the API server accepts requests from this client.";

/// Errors produced by the auth and catalog operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Required input missing; detected before any request is made
    #[error("{0}")]
    Validation(String),

    /// The endpoint answered with a non-success status or an unusable body
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Success status, but the cheat list is missing or not a list
    #[error("Received cheat data in an invalid format")]
    MalformedResponse,

    /// The request could not complete
    #[error("{message}")]
    Transport { message: String, network_hint: bool },
}

impl RequestError {
    /// Text shown to the user for a failed operation.
    ///
    /// `failed` prefixes API failures and `network` prefixes transport
    /// failures; validation and malformed-data errors are shown as-is.
    pub fn user_message(&self, failed: &str, network: &str) -> String {
        match self {
            RequestError::Validation(text) => text.clone(),
            RequestError::Api { message, .. } => format!("{}: {}", failed, message),
            RequestError::MalformedResponse => self.to_string(),
            RequestError::Transport {
                message,
                network_hint,
            } => {
                let mut text = format!("{}: {}", network, message);
                if *network_hint {
                    text.push_str(NETWORK_HINT);
                }
                text
            }
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// HTTP client for the CheatSlips v1 API
///
/// Issues exactly one request per call and never retries. No request timeout is
/// configured: a hung call stays pending until the server or the OS gives up.
pub struct CheatSlipsClient {
    http: reqwest::Client,
    base_url: Url,

    /// Matches transport error text that indicates the request never got an answer
    fetch_failure_pattern: Regex,
}

impl CheatSlipsClient {
    /// Create a client rooted at `base_url` (e.g. `https://www.cheatslips.com/api/v1`)
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL cannot carry a path: {}", base_url);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let fetch_failure_pattern = Regex::new(
            r"(?i)failed to fetch|error sending request|connection (refused|reset)|dns error|tcp connect",
        )
        .context("Invalid fetch failure regex")?;

        Ok(Self {
            http,
            base_url,
            fetch_failure_pattern,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST {base}/token` with the credentials as JSON
    pub async fn request_token(&self, credentials: &Credentials) -> Result<ApiToken, RequestError> {
        let url = self.endpoint(&["token"]);
        tracing::debug!("Requesting token from {}", url);

        let response = self
            .http
            .post(url)
            .json(&TokenRequest {
                email: credentials.email.trim(),
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = self.read_json(response).await?;

        let token = body
            .as_ref()
            .and_then(|b| b.get("token"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty());

        match token {
            Some(token) if status.is_success() => {
                let expiration = body
                    .as_ref()
                    .and_then(|b| b.get("expiration"))
                    .and_then(|e| e.as_str())
                    .unwrap_or_default();
                Ok(ApiToken::new(token, expiration))
            }
            _ => Err(Self::api_error(status, body.as_ref())),
        }
    }

    /// `GET {base}/cheats/{titleId}/{buildId}` authenticated with `token`
    pub async fn fetch_game(
        &self,
        token: &ApiToken,
        query: &QueryInput,
    ) -> Result<GameResult, RequestError> {
        let url = self.endpoint(&["cheats", &query.title_id, &query.build_id]);
        tracing::debug!("Requesting cheats from {}", url);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, &token.token)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = self.read_json(response).await?;

        if !status.is_success() {
            return Err(Self::api_error(status, body.as_ref()));
        }

        let body = body.ok_or(RequestError::MalformedResponse)?;
        if !body.get("cheats").is_some_and(|c| c.is_array()) {
            return Err(RequestError::MalformedResponse);
        }

        serde_json::from_value(body).map_err(|e| {
            tracing::warn!("Cheat list did not match the expected shape: {}", e);
            RequestError::MalformedResponse
        })
    }

    /// Read the body and parse it as JSON; a non-JSON body becomes `None`
    async fn read_json(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<serde_json::Value>, RequestError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;
        Ok(serde_json::from_slice(&bytes).ok())
    }

    /// Message extraction order: `message`, `title`, flattened `errors`,
    /// then `"<status code>: <status text>"`
    fn api_error(status: StatusCode, body: Option<&serde_json::Value>) -> RequestError {
        let message = body
            .map(ApiErrorBody::from_value)
            .and_then(|b| b.message())
            .unwrap_or_else(|| {
                format!(
                    "{}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown Status")
                )
            });

        RequestError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn transport_error(&self, err: &reqwest::Error) -> RequestError {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        let network_hint =
            err.is_connect() || err.is_timeout() || self.looks_like_fetch_failure(&message);

        tracing::warn!("Transport error: {}", message);
        RequestError::Transport {
            message,
            network_hint,
        }
    }

    /// Whether transport error text indicates a failed fetch
    pub fn looks_like_fetch_failure(&self, text: &str) -> bool {
        self.fetch_failure_pattern.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = CheatSlipsClient::new("https://www.cheatslips.com/api/v1").unwrap();

        let url = client.endpoint(&["cheats", "0100A3D008C5C000", "421C5411B487EB4D"]);
        assert_eq!(
            url.as_str(),
            "https://www.cheatslips.com/api/v1/cheats/0100A3D008C5C000/421C5411B487EB4D"
        );

        let url = client.endpoint(&["cheats", "a/b", "c d"]);
        assert_eq!(
            url.as_str(),
            "https://www.cheatslips.com/api/v1/cheats/a%2Fb/c%20d"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let client = CheatSlipsClient::new("http://localhost:8080/api/v1/").unwrap();
        assert_eq!(
            client.endpoint(&["token"]).as_str(),
            "http://localhost:8080/api/v1/token"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(CheatSlipsClient::new("not a url").is_err());
        assert!(CheatSlipsClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_api_error_fallbacks() {
        let err = CheatSlipsClient::api_error(
            StatusCode::UNAUTHORIZED,
            Some(&json!({"message": "Invalid credentials"})),
        );
        assert_eq!(
            err,
            RequestError::Api {
                status: 401,
                message: "Invalid credentials".to_string()
            }
        );

        let err = CheatSlipsClient::api_error(StatusCode::NOT_FOUND, None);
        assert_eq!(err.to_string(), "404: Not Found");

        let err = CheatSlipsClient::api_error(StatusCode::BAD_REQUEST, Some(&json!({"foo": 1})));
        assert_eq!(err.to_string(), "400: Bad Request");
    }

    #[test]
    fn test_fetch_failure_pattern() {
        let client = CheatSlipsClient::new("https://www.cheatslips.com/api/v1").unwrap();

        assert!(client.looks_like_fetch_failure("TypeError: Failed to fetch"));
        assert!(client.looks_like_fetch_failure(
            "error sending request for url (http://127.0.0.1:1/token)"
        ));
        assert!(!client.looks_like_fetch_failure("error decoding response body"));
    }

    #[test]
    fn test_user_message_formatting() {
        let err = RequestError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(
            err.user_message("Failed to get token", "Network error"),
            "Failed to get token: Unauthorized"
        );

        let err = RequestError::Transport {
            message: "error sending request".to_string(),
            network_hint: true,
        };
        let text = err.user_message("Failed", "Network error while requesting token");
        assert!(text.starts_with("Network error while requesting token: error sending request"));
        assert!(text.ends_with(NETWORK_HINT));

        let err = RequestError::Transport {
            message: "body too large".to_string(),
            network_hint: false,
        };
        assert!(!err.user_message("Failed", "Network").contains("cross-origin"));

        assert_eq!(
            RequestError::MalformedResponse.user_message("Failed", "Network"),
            "Received cheat data in an invalid format"
        );
    }
}
