use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL of the CheatSlips v1 API.
pub const DEFAULT_API_BASE_URL: &str = "https://www.cheatslips.com/api/v1";

/// How long a notification stays visible.
pub const DEFAULT_NOTIFICATION_SECS: u64 = 5;

/// How long a cheat entry shows the "copied" marker.
pub const DEFAULT_COPY_FEEDBACK_MILLIS: u64 = 2000;

/// User configuration from `CheatHub Config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "CheatHub_Settings", default)]
    pub cheathub_settings: HubSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    #[serde(rename = "Notification Seconds", default = "default_notification_secs")]
    pub notification_secs: u64,

    #[serde(rename = "Copy Feedback Millis", default = "default_copy_feedback_millis")]
    pub copy_feedback_millis: u64,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Logging", default)]
    pub console_logging: bool,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            notification_secs: DEFAULT_NOTIFICATION_SECS,
            copy_feedback_millis: DEFAULT_COPY_FEEDBACK_MILLIS,
            log_dir: default_log_dir(),
            debug_mode: false,
            console_logging: false,
        }
    }
}

fn default_notification_secs() -> u64 {
    DEFAULT_NOTIFICATION_SECS
}

fn default_copy_feedback_millis() -> u64 {
    DEFAULT_COPY_FEEDBACK_MILLIS
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Auto-clear delays used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub notification: Duration,
    pub copy_feedback: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            notification: Duration::from_secs(DEFAULT_NOTIFICATION_SECS),
            copy_feedback: Duration::from_millis(DEFAULT_COPY_FEEDBACK_MILLIS),
        }
    }
}

impl UserConfig {
    pub fn timings(&self) -> Timings {
        Timings {
            notification: Duration::from_secs(self.cheathub_settings.notification_secs),
            copy_feedback: Duration::from_millis(self.cheathub_settings.copy_feedback_millis),
        }
    }
}
