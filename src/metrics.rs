// Performance metrics module
//
// Provides lightweight counters for monitoring request outcomes over a session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Logged on
/// shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Token requests sent to the server
    pub auth_attempts: AtomicU64,

    /// Token requests that produced a token
    pub auth_succeeded: AtomicU64,

    /// Token requests that failed (API or transport)
    pub auth_failed: AtomicU64,

    /// Cheat queries sent to the server
    pub queries_attempted: AtomicU64,

    /// Cheat queries that produced a stored result
    pub queries_succeeded: AtomicU64,

    /// Cheat queries that failed (API, transport, or malformed data)
    pub queries_failed: AtomicU64,

    /// Operations rejected before any request because input was missing
    pub validation_rejections: AtomicU64,

    /// Successful clipboard copies
    pub cheats_copied: AtomicU64,

    /// Clipboard writes that failed
    pub copy_failures: AtomicU64,

    /// Cumulative time spent waiting on the API in milliseconds
    pub total_request_time_ms: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            auth_attempts: AtomicU64::new(0),
            auth_succeeded: AtomicU64::new(0),
            auth_failed: AtomicU64::new(0),
            queries_attempted: AtomicU64::new(0),
            queries_succeeded: AtomicU64::new(0),
            queries_failed: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            cheats_copied: AtomicU64::new(0),
            copy_failures: AtomicU64::new(0),
            total_request_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_auth(&self, succeeded: bool) {
        self.auth_attempts.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.auth_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.auth_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_query(&self, succeeded: bool) {
        self.queries_attempted.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.queries_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.queries_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_copy(&self, succeeded: bool) {
        if succeeded {
            self.cheats_copied.fetch_add(1, Ordering::Relaxed);
        } else {
            self.copy_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_request_time(&self, duration: Duration) {
        self.total_request_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average API round trip in milliseconds
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.auth_attempts.load(Ordering::Relaxed)
            + self.queries_attempted.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Token requests: {} sent, {} succeeded, {} failed",
            self.auth_attempts.load(Ordering::Relaxed),
            self.auth_succeeded.load(Ordering::Relaxed),
            self.auth_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Cheat queries: {} sent, {} succeeded, {} failed",
            self.queries_attempted.load(Ordering::Relaxed),
            self.queries_succeeded.load(Ordering::Relaxed),
            self.queries_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Rejected before sending: {}, avg round trip: {:.2}ms",
            self.validation_rejections.load(Ordering::Relaxed),
            self.avg_request_time_ms()
        );
        tracing::info!(
            "Clipboard: {} copied, {} failed",
            self.cheats_copied.load(Ordering::Relaxed),
            self.copy_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
