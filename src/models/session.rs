use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login form input. Held in memory only.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are non-empty after trimming.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }
}

// Never print the password, not even in debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token issued by the authentication endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    pub token: String,

    /// Expiration exactly as the server sent it (ISO-8601).
    #[serde(default)]
    pub expiration: String,
}

impl ApiToken {
    pub fn new(token: impl Into<String>, expiration: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expiration: expiration.into(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expiration)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Expiration rendered in the local time zone, or the raw string when it
    /// does not parse.
    pub fn expiration_display(&self) -> String {
        match self.expires_at() {
            Some(dt) => dt
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => self.expiration.clone(),
        }
    }

    /// Short prefix that is safe to put in logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.token.chars().take(6).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("token", &self.redacted())
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Query form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    pub title_id: String,
    pub build_id: String,
}

impl QueryInput {
    pub fn new(title_id: impl Into<String>, build_id: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            build_id: build_id.into(),
        }
    }
}
