use std::collections::HashSet;

/// Per-entry view state for the active [`GameResult`](crate::models::GameResult).
///
/// `generation` is bumped on every [`reset`](Self::reset) so deferred copy-state
/// removals scheduled against an older result can be recognised and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisclosureState {
    expanded: HashSet<String>,
    copied: HashSet<String>,
    generation: u64,
}

impl DisclosureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id` in the expanded set. Returns the new membership.
    pub fn toggle_expand(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn mark_copied(&mut self, id: &str) {
        self.copied.insert(id.to_string());
    }

    /// Remove `id` from the copied set, but only if the state has not been
    /// reset since `generation` was observed.
    pub fn clear_copied(&mut self, id: &str, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.copied.remove(id)
    }

    /// Collapse everything and forget copy state.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.copied.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_copied(&self, id: &str) -> bool {
        self.copied.contains(id)
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn copied(&self) -> &HashSet<String> {
        &self.copied
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty() && self.copied.is_empty()
    }
}
