use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Keyed one-shot delays on the tokio runtime
///
/// Scheduling a key that already has a pending delay aborts the old one, so at
/// most one callback per key is ever outstanding.
pub struct TimerRegistry<K> {
    handle: tokio::runtime::Handle,
    tasks: Arc<Mutex<HashMap<K, (u64, AbortHandle)>>>,
    next_id: Arc<AtomicU64>,
}

impl<K> Clone for TimerRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            tasks: Arc::clone(&self.tasks),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<K> TimerRegistry<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `on_expire` after `delay` unless `key` is rescheduled or cancelled first
    pub fn schedule<F>(&self, key: K, delay: Duration, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);
        let task_key = key.clone();

        // Hold the lock across spawn so the task cannot finish before its entry exists
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut pending = tasks.lock().unwrap_or_else(PoisonError::into_inner);
                match pending.get(&task_key) {
                    Some((current, _)) if *current == id => {
                        pending.remove(&task_key);
                    }
                    // Superseded between wake-up and lock
                    _ => return,
                }
            }

            on_expire();
        });

        if let Some((_, previous)) = pending.insert(key, (id, join.abort_handle())) {
            previous.abort();
        }
    }

    /// Abort the pending delay for `key`, if any
    pub fn cancel(&self, key: &K) -> bool {
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.remove(key) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every pending delay
    pub fn cancel_all(&self) {
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, (_, handle)) in pending.drain() {
            handle.abort();
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
