use std::fmt;

/// Notification channel. Each channel holds at most one live notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Auth,
    Query,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Auth => write!(f, "auth"),
            Channel::Query => write!(f, "query"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Transient user-facing message.
///
/// `seq` is assigned by [`NotificationCenter`](crate::services::NotificationCenter)
/// and distinguishes two posts with identical text, so a stale auto-clear never
/// removes a newer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub severity: Severity,
    pub text: String,
    pub seq: u64,
}

impl Notification {
    pub fn new(channel: Channel, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            channel,
            severity,
            text: text.into(),
            seq: 0,
        }
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }
}
