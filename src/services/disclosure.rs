use crate::models::GameResult;
use crate::services::timers::TimerRegistry;
use crate::state::StateManager;
use std::time::Duration;

/// Expanded/copied markers for the entries of the active result
///
/// Owns the copy-feedback timers. Replacing the result goes through
/// [`replace_result`](Self::replace_result) so both marker sets and every
/// pending timer are dropped together.
#[derive(Clone)]
pub struct ResultDisclosure {
    state: StateManager,
    copy_timers: TimerRegistry<String>,
    copy_feedback: Duration,
}

impl ResultDisclosure {
    pub fn new(state: StateManager, handle: tokio::runtime::Handle, copy_feedback: Duration) -> Self {
        Self {
            state,
            copy_timers: TimerRegistry::new(handle),
            copy_feedback,
        }
    }

    /// Flip the expanded marker for `id`. Returns whether it is now expanded.
    pub fn toggle_expand(&self, id: &str) -> bool {
        self.state.toggle_expand(id);
        let expanded = self.state.read(|s| s.disclosure.is_expanded(id));
        tracing::trace!("Cheat {} expanded={}", id, expanded);
        expanded
    }

    /// Show the copied marker for `id` and schedule its removal
    pub fn mark_copied(&self, id: &str) {
        let generation = self.state.mark_copied(id);
        self.schedule_clear(id, generation);
    }

    /// Like [`mark_copied`](Self::mark_copied), unless the result was replaced
    /// after `generation` was read. Returns whether the marker was set.
    pub fn mark_copied_at(&self, id: &str, generation: u64) -> bool {
        let marked = self.state.mark_copied_at(id, generation);
        if marked {
            self.schedule_clear(id, generation);
        }
        marked
    }

    /// Current disclosure generation; bumped on every result replacement
    pub fn generation(&self) -> u64 {
        self.state.read(|s| s.disclosure.generation())
    }

    fn schedule_clear(&self, id: &str, generation: u64) {
        let state = self.state.clone();
        let key = id.to_string();
        self.copy_timers
            .schedule(key.clone(), self.copy_feedback, move || {
                state.clear_copied(&key, generation);
            });
    }

    /// Swap in a new result (or none) and reset all markers
    pub fn replace_result(&self, result: Option<GameResult>) {
        self.copy_timers.cancel_all();
        self.state.replace_game_result(result);
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.state.read(|s| s.disclosure.is_expanded(id))
    }

    pub fn is_copied(&self, id: &str) -> bool {
        self.state.read(|s| s.disclosure.is_copied(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disclosure() -> ResultDisclosure {
        ResultDisclosure::new(
            StateManager::new(),
            tokio::runtime::Handle::current(),
            Duration::from_secs(2),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_marker_expires() {
        let disclosure = disclosure();
        disclosure.mark_copied("1");
        assert!(disclosure.is_copied("1"));

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(disclosure.is_copied("1"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!disclosure.is_copied("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_result_drops_markers_and_timers() {
        let disclosure = disclosure();
        disclosure.toggle_expand("1");
        disclosure.mark_copied("2");

        disclosure.replace_result(None);
        assert!(!disclosure.is_expanded("1"));
        assert!(!disclosure.is_copied("2"));

        // A copy on the new result must survive the old timer's deadline
        tokio::time::sleep(Duration::from_secs(1)).await;
        disclosure.mark_copied("2");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(disclosure.is_copied("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recopy_restarts_feedback() {
        let disclosure = disclosure();
        disclosure.mark_copied("1");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        disclosure.mark_copied("1");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(disclosure.is_copied("1"));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!disclosure.is_copied("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_copied_at_skips_replaced_result() {
        let disclosure = disclosure();
        let before = disclosure.generation();

        disclosure.replace_result(None);
        assert!(!disclosure.mark_copied_at("1", before));
        assert!(!disclosure.is_copied("1"));

        assert!(disclosure.mark_copied_at("1", disclosure.generation()));
        assert!(disclosure.is_copied("1"));
    }
}
