use crate::models::{Channel, Notification, Severity};
use crate::services::timers::TimerRegistry;
use crate::state::StateManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// One transient message per channel, auto-cleared after a fixed delay
///
/// Posting on a channel supersedes its current message and restarts that
/// channel's timer. Channels never affect each other.
#[derive(Clone)]
pub struct NotificationCenter {
    state: StateManager,
    timers: TimerRegistry<Channel>,
    display_for: Duration,
    next_seq: Arc<AtomicU64>,
}

impl NotificationCenter {
    pub fn new(state: StateManager, handle: tokio::runtime::Handle, display_for: Duration) -> Self {
        Self {
            state,
            timers: TimerRegistry::new(handle),
            display_for,
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn post(&self, channel: Channel, severity: Severity, text: impl Into<String>) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let notification = Notification::new(channel, severity, text).with_seq(seq);

        tracing::debug!("[{}] {}: {}", channel, severity, notification.text);
        self.state.set_notification(notification);

        let state = self.state.clone();
        self.timers.schedule(channel, self.display_for, move || {
            state.clear_notification(channel, Some(seq));
        });
    }

    pub fn clear(&self, channel: Channel) {
        self.timers.cancel(&channel);
        self.state.clear_notification(channel, None);
    }

    pub fn current(&self, channel: Channel) -> Option<Notification> {
        self.state.read(|s| s.notification(channel).cloned())
    }
}
